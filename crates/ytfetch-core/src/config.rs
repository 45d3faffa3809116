use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per job (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds; the wait after attempt n is base * 2^n.
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 1.0,
            max_delay_secs: 60,
        }
    }
}

impl RetryConfig {
    /// Out-of-range base delays (`inf`, huge values) are clamped to the cap.
    pub fn to_policy(&self) -> RetryPolicy {
        let max_delay = Duration::from_secs(self.max_delay_secs);
        let base_delay = Duration::try_from_secs_f64(self.base_delay_secs.max(0.0)).unwrap_or_else(|_| {
            tracing::warn!(
                "retry.base_delay_secs = {} is out of range; using {}s",
                self.base_delay_secs,
                self.max_delay_secs
            );
            max_delay
        });
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }
}

/// Global configuration loaded from `~/.config/ytfetch/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YtfetchConfig {
    /// Directory downloads are written to. Defaults to the user's desktop.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// Explicit ffmpeg binary; checked before PATH and the well-known directories.
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,
    /// yt-dlp executable (name resolved via PATH, or an absolute path).
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,
    /// Default batch worker count when `--workers` is not given.
    #[serde(default)]
    pub workers: Option<usize>,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl YtfetchConfig {
    /// Output directory, falling back to the desktop directory.
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(default_output_dir)
    }

    pub fn ytdlp_program(&self) -> PathBuf {
        self.ytdlp_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("yt-dlp"))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.clone().unwrap_or_default().to_policy()
    }
}

/// The user's desktop (`~/Desktop` when the platform reports none).
pub fn default_output_dir() -> PathBuf {
    dirs::desktop_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join("Desktop")))
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("ytfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<YtfetchConfig> {
    let path = config_path()?;
    load_or_init_at(&path)
}

pub fn load_or_init_at(path: &Path) -> Result<YtfetchConfig> {
    if !path.exists() {
        let default_cfg = YtfetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: YtfetchConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_retry_matches_backoff_contract() {
        let p = RetryConfig::default().to_policy();
        assert_eq!(p.max_attempts, 3);
        assert_eq!(p.base_delay, Duration::from_secs(1));
        assert_eq!(p.max_delay, Duration::from_secs(60));
    }

    #[test]
    fn empty_toml_is_all_defaults() {
        let cfg: YtfetchConfig = toml::from_str("").unwrap();
        assert!(cfg.output_dir.is_none());
        assert!(cfg.workers.is_none());
        assert_eq!(cfg.ytdlp_program(), PathBuf::from("yt-dlp"));
        assert_eq!(cfg.retry_policy().max_attempts, 3);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            output_dir = "/srv/media"
            ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"
            workers = 2

            [retry]
            max_attempts = 5
            base_delay_secs = 0.5
            max_delay_secs = 15
        "#;
        let cfg: YtfetchConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.resolved_output_dir(), PathBuf::from("/srv/media"));
        assert_eq!(cfg.ffmpeg_path.as_deref(), Some(Path::new("/opt/ffmpeg/bin/ffmpeg")));
        assert_eq!(cfg.workers, Some(2));
        let policy = cfg.retry_policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay, Duration::from_millis(500));
        assert_eq!(policy.max_delay, Duration::from_secs(15));
    }

    #[test]
    fn load_or_init_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = load_or_init_at(&path).unwrap();
        assert!(path.exists());
        assert!(cfg.retry.is_none());

        let reloaded = load_or_init_at(&path).unwrap();
        assert!(reloaded.output_dir.is_none());
    }

    #[test]
    fn out_of_range_base_delay_is_clamped_to_cap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        for base in ["inf", "1e30", "nan", "-3.0"] {
            fs::write(
                &path,
                format!("[retry]\nmax_attempts = 3\nbase_delay_secs = {base}\nmax_delay_secs = 60\n"),
            )
            .unwrap();
            let policy = load_or_init_at(&path).unwrap().retry_policy();
            assert!(policy.base_delay <= Duration::from_secs(60), "base {base}");
            assert!(policy.backoff(2) <= Duration::from_secs(60), "base {base}");
        }
    }

    #[test]
    fn load_rejects_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "workers = \"many\"").unwrap();
        assert!(load_or_init_at(&path).is_err());
    }
}
