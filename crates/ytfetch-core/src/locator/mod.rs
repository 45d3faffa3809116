//! Binary locator for the media-processing binary (ffmpeg).
//!
//! Search order: explicit override from config → every directory on `PATH`
//! → a short list of well-known install directories for the platform.
//! The first existing executable wins and is confirmed by running
//! `<bin> -version`. Nothing is written; the only side effect is the
//! version-check subprocess.

mod hint;
mod search;

pub use hint::install_hint;
pub use search::{is_executable, well_known_dirs, BinarySearch};

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::OnceLock;

/// Result of a locate call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryLocation {
    /// First matching executable, if any.
    pub path: Option<PathBuf>,
    /// True only when the binary exists and its version check exited 0.
    pub verified: bool,
}

impl BinaryLocation {
    pub fn missing() -> Self {
        Self {
            path: None,
            verified: false,
        }
    }

    /// Path to use for the job, only when verified.
    pub fn usable_path(&self) -> Option<&Path> {
        if self.verified {
            self.path.as_deref()
        } else {
            None
        }
    }
}

/// Something that can find the media binary. Seam for tests and caching.
pub trait Locate: Send + Sync {
    /// Display name of the binary, used in error messages.
    fn binary_name(&self) -> &str {
        "FFmpeg"
    }

    fn locate(&self) -> BinaryLocation;

    /// Platform-specific installation instructions.
    fn install_hint(&self) -> String {
        install_hint()
    }
}

/// Locates ffmpeg on the host.
#[derive(Debug, Clone)]
pub struct FfmpegLocator {
    search: BinarySearch,
}

impl FfmpegLocator {
    /// Locator using the process `PATH` and the platform's well-known dirs,
    /// with an optional explicit path tried first.
    pub fn new(override_path: Option<PathBuf>) -> Self {
        Self {
            search: BinarySearch::from_env("ffmpeg").with_override(override_path),
        }
    }

    pub fn with_search(search: BinarySearch) -> Self {
        Self { search }
    }
}

impl Locate for FfmpegLocator {
    fn locate(&self) -> BinaryLocation {
        let Some(path) = self.search.find() else {
            tracing::debug!("ffmpeg not found on PATH or in well-known directories");
            return BinaryLocation::missing();
        };
        let verified = version_check(&path);
        if verified {
            tracing::info!("FFmpeg found at: {}", path.display());
        } else {
            tracing::warn!("{} exists but `-version` did not succeed", path.display());
        }
        BinaryLocation {
            path: Some(path),
            verified,
        }
    }
}

/// Run `<bin> -version` and report whether it exited successfully.
pub fn version_check(path: &Path) -> bool {
    match Command::new(path)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(status) => status.success(),
        Err(e) => {
            tracing::debug!("version check for {} failed: {}", path.display(), e);
            false
        }
    }
}

/// Probes once per run and reuses the answer for every later job.
pub struct CachedLocator<L> {
    inner: L,
    cached: OnceLock<BinaryLocation>,
}

impl<L: Locate> CachedLocator<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            cached: OnceLock::new(),
        }
    }
}

impl<L: Locate> Locate for CachedLocator<L> {
    fn binary_name(&self) -> &str {
        self.inner.binary_name()
    }

    fn locate(&self) -> BinaryLocation {
        self.cached.get_or_init(|| self.inner.locate()).clone()
    }

    fn install_hint(&self) -> String {
        self.inner.install_hint()
    }
}
