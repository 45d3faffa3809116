//! Extraction backend: the external program that resolves a URL to media
//! streams and writes files to disk.
//!
//! The job runner talks to it through the [`Extractor`] trait; the only
//! production implementation drives `yt-dlp` as a child process.

mod progress;
mod ytdlp;

pub use progress::{
    notify_hook, parse_progress_line, progress_template, LogProgress, ProgressEvent, ProgressHook,
    TransferStats, PROGRESS_PREFIX,
};
pub use ytdlp::{summarize_stderr, YtDlp};

use std::path::PathBuf;
use thiserror::Error;

use crate::options::ExtractorOptions;

/// Failure reported by an extractor invocation.
#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("could not start {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{message}")]
    Failed { code: Option<i32>, message: String },

    #[error("i/o error talking to extractor: {0}")]
    Io(#[from] std::io::Error),
}

/// Downloads one URL with the given options, reporting progress events as
/// they arrive. Blocking; returns when the transfer (and any post-processing)
/// has finished.
pub trait Extractor: Send + Sync {
    fn download(
        &self,
        url: &str,
        options: &ExtractorOptions,
        on_event: &mut dyn FnMut(ProgressEvent),
    ) -> Result<(), ExtractorError>;
}
