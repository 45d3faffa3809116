//! Download jobs: the request/outcome data model and the single-job runner.

mod request;
mod runner;

pub use request::{DownloadRequest, JobOutcome, Resolution};
pub use runner::{Downloader, JobRunner};
