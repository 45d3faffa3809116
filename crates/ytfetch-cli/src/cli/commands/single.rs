//! `ytfetch URL` – download one video or playlist in the foreground.

use anyhow::Result;
use std::process::ExitCode;
use ytfetch_core::config;
use ytfetch_core::control::StopSignal;
use ytfetch_core::job::{DownloadRequest, JobRunner};

use super::build_downloader;
use crate::cli::interrupt::run_interruptible;

pub async fn run_single(request: DownloadRequest) -> Result<ExitCode> {
    let cfg = config::load_or_init()?;
    tracing::debug!("loaded config: {:?}", cfg);

    let stop = StopSignal::new();
    let runner = build_downloader(&cfg, stop.clone());
    if request.is_playlist {
        tracing::info!("Downloading playlist: {}", request.url);
    }
    let (res, interrupted) = run_interruptible(stop, move || runner.run(&request)).await?;
    if interrupted {
        tracing::info!("Download interrupted by user");
        return Ok(ExitCode::FAILURE);
    }
    res?;
    Ok(ExitCode::SUCCESS)
}
