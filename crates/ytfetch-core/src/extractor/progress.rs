//! Progress events from the extractor, the logging hook, and best-effort
//! hook invocation.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Marker that prefixes every machine-readable progress line.
pub const PROGRESS_PREFIX: &str = "[ytfetch-progress]";

const FIELD_SEP: char = '|';
const MIB: f64 = 1024.0 * 1024.0;

/// `--progress-template` value producing lines that [`parse_progress_line`] understands.
/// The filename goes last because it may contain the separator.
pub fn progress_template() -> String {
    format!(
        "download:{PROGRESS_PREFIX} %(progress.status)s|%(progress.downloaded_bytes)s|\
         %(progress.total_bytes)s|%(progress.total_bytes_estimate)s|%(progress.speed)s|\
         %(progress.filename)s"
    )
}

/// One progress notification from the extractor.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Downloading {
        filename: String,
        downloaded_bytes: u64,
        /// Exact total, else the extractor's estimate, if any.
        total_bytes: Option<u64>,
        /// Bytes per second.
        speed: Option<f64>,
    },
    Finished {
        filename: String,
    },
    Error {
        message: String,
    },
}

fn number(field: &str) -> Option<f64> {
    let field = field.trim();
    if field.is_empty() || field == "NA" || field == "None" {
        return None;
    }
    field.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}

/// Parse one stdout line; `None` for anything that is not a progress line.
pub fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let rest = line.trim().strip_prefix(PROGRESS_PREFIX)?.trim_start();
    let mut fields = rest.splitn(6, FIELD_SEP);
    let status = fields.next()?.trim();
    let downloaded = fields.next().and_then(number);
    let total = fields.next().and_then(number);
    let estimate = fields.next().and_then(number);
    let speed = fields.next().and_then(number);
    let filename = fields
        .next()
        .map(|f| f.trim())
        .filter(|f| !f.is_empty() && *f != "NA")
        .unwrap_or("Unknown")
        .to_string();

    match status {
        "downloading" => Some(ProgressEvent::Downloading {
            filename,
            downloaded_bytes: downloaded.unwrap_or(0.0) as u64,
            total_bytes: total.or(estimate).map(|t| t as u64).filter(|t| *t > 0),
            speed,
        }),
        "finished" => Some(ProgressEvent::Finished { filename }),
        "error" => Some(ProgressEvent::Error {
            message: format!("error while downloading {filename}"),
        }),
        _ => None,
    }
}

/// Snapshot of one transfer, for percentage and throughput display.
#[derive(Debug, Clone, Copy)]
pub struct TransferStats {
    pub bytes_done: u64,
    pub total_bytes: Option<u64>,
    pub bytes_per_sec: f64,
}

impl TransferStats {
    /// Fraction complete in [0.0, 1.0], if the total is known.
    pub fn fraction(&self) -> Option<f64> {
        let total = self.total_bytes?;
        if total == 0 {
            return Some(1.0);
        }
        Some((self.bytes_done as f64 / total as f64).min(1.0))
    }

    pub fn mib_done(&self) -> f64 {
        self.bytes_done as f64 / MIB
    }

    pub fn mib_per_sec(&self) -> f64 {
        self.bytes_per_sec / MIB
    }

    /// Console line: percentage and rate with a known total, raw size otherwise.
    pub fn describe(&self, filename: &str) -> String {
        match self.fraction() {
            Some(f) => format!(
                "Downloading {}: {:.1}% complete ({:.1} MB/s)",
                filename,
                f * 100.0,
                self.mib_per_sec()
            ),
            None => format!("Downloading {}: {:.1} MB downloaded", filename, self.mib_done()),
        }
    }
}

/// Receives progress events. Errors and panics are isolated by [`notify_hook`].
pub trait ProgressHook: Send + Sync {
    fn on_event(&self, url: &str, event: &ProgressEvent) -> anyhow::Result<()>;
}

/// Invoke a hook on a best-effort basis; failures are logged and never
/// interrupt the transfer.
pub fn notify_hook(hook: &dyn ProgressHook, url: &str, event: &ProgressEvent) {
    match catch_unwind(AssertUnwindSafe(|| hook.on_event(url, event))) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("Progress hook error: {:#}", e),
        Err(_) => tracing::error!("Progress hook panicked while handling {:?}", event),
    }
}

/// Logs progress through `tracing`, at most once per interval per file.
pub struct LogProgress {
    interval: Duration,
    /// Last log time per (url, filename).
    last: Mutex<HashMap<(String, String), Instant>>,
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

impl LogProgress {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(HashMap::new()),
        }
    }

    fn due(&self, url: &str, filename: &str) -> bool {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        let key = (url.to_string(), filename.to_string());
        match last.get(&key) {
            Some(t) if now.duration_since(*t) < self.interval => false,
            _ => {
                last.insert(key, now);
                true
            }
        }
    }

    /// Drop throttle state for `url`, either one file or all of them.
    fn forget(&self, url: &str, filename: Option<&str>) {
        self.last
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|(u, f), _| u != url || filename.is_some_and(|name| f != name));
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.last.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl ProgressHook for LogProgress {
    fn on_event(&self, url: &str, event: &ProgressEvent) -> anyhow::Result<()> {
        match event {
            ProgressEvent::Downloading {
                filename,
                downloaded_bytes,
                total_bytes,
                speed,
            } => {
                if self.due(url, filename) {
                    let stats = TransferStats {
                        bytes_done: *downloaded_bytes,
                        total_bytes: *total_bytes,
                        bytes_per_sec: speed.unwrap_or(0.0),
                    };
                    tracing::info!("{}", stats.describe(filename));
                }
            }
            ProgressEvent::Finished { filename } => {
                self.forget(url, Some(filename));
                tracing::info!("Download complete: {}", filename);
            }
            ProgressEvent::Error { message } => {
                // yt-dlp's error event names no file; clear the whole job.
                self.forget(url, None);
                tracing::error!("Download error: {}", message);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_downloading_with_total() {
        let line = "[ytfetch-progress] downloading|1048576|4194304|NA|2097152.5|/out/Clip.f137.mp4";
        assert_eq!(
            parse_progress_line(line),
            Some(ProgressEvent::Downloading {
                filename: "/out/Clip.f137.mp4".into(),
                downloaded_bytes: 1_048_576,
                total_bytes: Some(4_194_304),
                speed: Some(2_097_152.5),
            })
        );
    }

    #[test]
    fn falls_back_to_estimate_and_tolerates_missing_fields() {
        let line = "[ytfetch-progress] downloading|512|NA|2048.0|NA|a|b.webm";
        match parse_progress_line(line).unwrap() {
            ProgressEvent::Downloading {
                filename,
                total_bytes,
                speed,
                ..
            } => {
                assert_eq!(filename, "a|b.webm");
                assert_eq!(total_bytes, Some(2048));
                assert_eq!(speed, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_finished_and_error() {
        assert_eq!(
            parse_progress_line("[ytfetch-progress] finished|10|10|NA|NA|x.mp4"),
            Some(ProgressEvent::Finished {
                filename: "x.mp4".into()
            })
        );
        assert!(matches!(
            parse_progress_line("[ytfetch-progress] error|NA|NA|NA|NA|x.mp4"),
            Some(ProgressEvent::Error { .. })
        ));
    }

    #[test]
    fn ignores_other_lines() {
        assert_eq!(parse_progress_line("[youtube] abc: Downloading webpage"), None);
        assert_eq!(parse_progress_line(""), None);
        assert_eq!(parse_progress_line("[ytfetch-progress] paused|1|2|3|4|f"), None);
    }

    #[test]
    fn template_uses_prefix() {
        let t = progress_template();
        assert!(t.starts_with("download:[ytfetch-progress] %(progress.status)s|"));
        assert!(t.ends_with("%(progress.filename)s"));
    }

    #[test]
    fn describe_with_and_without_total() {
        let known = TransferStats {
            bytes_done: 50,
            total_bytes: Some(200),
            bytes_per_sec: 1_048_576.0,
        };
        assert_eq!(known.describe("f"), "Downloading f: 25.0% complete (1.0 MB/s)");
        let unknown = TransferStats {
            bytes_done: 3 * 1_048_576,
            total_bytes: None,
            bytes_per_sec: 0.0,
        };
        assert_eq!(unknown.describe("f"), "Downloading f: 3.0 MB downloaded");
    }

    struct Failing;

    impl ProgressHook for Failing {
        fn on_event(&self, _url: &str, _event: &ProgressEvent) -> anyhow::Result<()> {
            anyhow::bail!("display went away")
        }
    }

    struct Panicking;

    impl ProgressHook for Panicking {
        fn on_event(&self, _url: &str, _event: &ProgressEvent) -> anyhow::Result<()> {
            panic!("hook bug")
        }
    }

    #[test]
    fn notify_hook_swallows_errors_and_panics() {
        let ev = ProgressEvent::Finished {
            filename: "x".into(),
        };
        notify_hook(&Failing, "u", &ev);
        notify_hook(&Panicking, "u", &ev);
    }

    #[test]
    fn log_progress_throttles_per_file() {
        let hook = LogProgress::new(Duration::from_secs(3600));
        assert!(hook.due("u", "a"));
        assert!(!hook.due("u", "a"));
        assert!(hook.due("u", "b"));
        assert!(hook.due("v", "a"));
    }

    fn downloading(filename: &str) -> ProgressEvent {
        ProgressEvent::Downloading {
            filename: filename.into(),
            downloaded_bytes: 1,
            total_bytes: None,
            speed: None,
        }
    }

    #[test]
    fn log_progress_releases_state_on_finish_and_error() {
        let hook = LogProgress::new(Duration::from_secs(3600));
        hook.on_event("u", &downloading("a")).unwrap();
        hook.on_event("u", &downloading("b")).unwrap();
        hook.on_event("v", &downloading("c")).unwrap();
        assert_eq!(hook.tracked(), 3);

        hook.on_event("u", &ProgressEvent::Finished { filename: "a".into() }).unwrap();
        assert_eq!(hook.tracked(), 2);

        hook.on_event("u", &ProgressEvent::Error { message: "boom".into() }).unwrap();
        assert_eq!(hook.tracked(), 1);
        assert!(hook.due("u", "b"));
        assert!(!hook.due("v", "c"));
    }
}
