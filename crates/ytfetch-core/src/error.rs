//! Error taxonomy shared by the job runner, batch orchestrator and CLI.

use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single download job.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The media binary (ffmpeg) could not be found or does not run.
    /// Raised before any network work is attempted.
    #[error("{binary} is required but was not found.\n\nInstallation instructions for your system:\n{hint}\n\nAfter installing, try running the command again.")]
    MissingDependency { binary: String, hint: String },

    /// The extractor failed for this URL (after all retries, when wrapped by the runner).
    #[error("Failed to download {url}: {message}")]
    Download { url: String, message: String },

    /// The user interrupted the run (Ctrl-C).
    #[error("download interrupted by user")]
    Interrupted,
}

impl FetchError {
    pub fn download(url: impl Into<String>, message: impl Into<String>) -> Self {
        FetchError::Download {
            url: url.into(),
            message: message.into(),
        }
    }
}

/// Batch file could not be used. Reported and the batch is skipped; never raised to the process.
#[derive(Debug, Error)]
pub enum BatchInputError {
    #[error("Batch file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Could not read batch file {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No URLs found in {}", .0.display())]
    Empty(PathBuf),
}
