//! `ytfetch --run-job JSON` – process-pool worker: run one job, print its outcome.
//!
//! Logs go to stderr (inherited by the parent); stdout carries only the
//! JSON-encoded [`JobOutcome`] line the parent parses.

use anyhow::{Context, Result};
use std::process::ExitCode;
use ytfetch_core::config;
use ytfetch_core::control::StopSignal;
use ytfetch_core::job::{DownloadRequest, JobOutcome, JobRunner};

use super::build_downloader;
use crate::cli::interrupt::run_interruptible;

pub async fn run_worker(payload: &str) -> Result<ExitCode> {
    let request: DownloadRequest =
        serde_json::from_str(payload).context("decoding --run-job payload")?;
    let cfg = config::load_or_init()?;

    let stop = StopSignal::new();
    let runner = build_downloader(&cfg, stop.clone());
    let (outcome, interrupted) = run_interruptible(stop, move || {
        let res = runner.run(&request);
        JobOutcome::from_result(&request.url, res)
    })
    .await?;

    println!("{}", serde_json::to_string(&outcome)?);
    if interrupted || !outcome.succeeded {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
