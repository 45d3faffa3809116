//! Batch orchestrator: one job per URL line, dispatched to a worker pool.
//!
//! Input problems (missing file, no URLs) are logged and the batch is
//! skipped before anything is dispatched. After dispatch, every job's
//! failure is isolated: it is logged and counted, and never affects other
//! jobs or the orchestrator.

pub mod pool;

use std::fs;
use std::path::Path;

use crate::control::StopSignal;
use crate::error::BatchInputError;
use crate::job::{DownloadRequest, JobOutcome};

pub use pool::{ExecutionMode, ProcessPool, ThreadPool, WorkerPool};

/// Fallback when the CPU count cannot be determined.
pub const FALLBACK_WORKERS: usize = 4;

/// Output options shared by every job of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSettings {
    pub resolution: String,
    pub output_format: String,
    pub extract_audio: bool,
    pub proxy: Option<String>,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            resolution: "best".to_string(),
            output_format: "mp4".to_string(),
            extract_audio: false,
            proxy: None,
        }
    }
}

impl BatchSettings {
    /// Batch lines are always single items, never playlists.
    pub fn request_for(&self, url: &str) -> DownloadRequest {
        DownloadRequest::new(url)
            .with_resolution(&self.resolution)
            .with_output_format(self.output_format.clone())
            .with_extract_audio(self.extract_audio)
            .with_playlist(false)
            .with_proxy(self.proxy.clone())
    }
}

/// Outcomes of one batch, in completion order.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub mode: ExecutionMode,
    pub workers: usize,
    pub dispatched: usize,
    pub outcomes: Vec<JobOutcome>,
    /// True when a stop request cut the batch short.
    pub interrupted: bool,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded).count()
    }

    pub fn failed(&self) -> Vec<&JobOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded).collect()
    }
}

/// Default worker count: logical CPUs, or [`FALLBACK_WORKERS`] if unknown.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(FALLBACK_WORKERS)
}

/// Non-blank lines, trimmed, in file order.
pub fn parse_urls(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read and validate the batch file.
pub fn load_urls(path: &Path) -> Result<Vec<String>, BatchInputError> {
    if !path.exists() {
        return Err(BatchInputError::NotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|source| BatchInputError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let urls = parse_urls(&text);
    if urls.is_empty() {
        return Err(BatchInputError::Empty(path.to_path_buf()));
    }
    Ok(urls)
}

/// Run every URL in `path` through `pool`. Returns `None` (after logging)
/// when the file cannot be used; nothing is dispatched in that case.
pub fn run_batch(
    path: &Path,
    settings: &BatchSettings,
    pool: &dyn WorkerPool,
    stop: &StopSignal,
) -> Option<BatchReport> {
    let urls = match load_urls(path) {
        Ok(urls) => urls,
        Err(e) => {
            tracing::error!("{}", e);
            return None;
        }
    };

    tracing::info!(
        "Starting batch download of {} URL(s) with {} {}...",
        urls.len(),
        pool.workers(),
        pool.mode()
    );

    let requests: Vec<DownloadRequest> = urls.iter().map(|u| settings.request_for(u)).collect();
    let dispatched = requests.len();
    let mut outcomes = Vec::with_capacity(dispatched);
    pool.execute(requests, stop, &mut |outcome| {
        if outcome.succeeded {
            tracing::info!("Completed download for: {}", outcome.url);
        } else {
            tracing::error!(
                "Download generated an exception for {}: {}",
                outcome.url,
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
        outcomes.push(outcome);
    });

    let report = BatchReport {
        mode: pool.mode(),
        workers: pool.workers(),
        dispatched,
        interrupted: stop.is_stopped() && outcomes.len() < dispatched,
        outcomes,
    };
    tracing::info!(
        "Batch finished: {} succeeded, {} failed, {} total",
        report.succeeded(),
        report.failed().len(),
        report.dispatched
    );
    Some(report)
}
