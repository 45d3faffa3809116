//! `ytfetch -b FILE` – download every URL in a file with a worker pool.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use ytfetch_core::batch::{self, BatchSettings, ExecutionMode, ProcessPool, ThreadPool, WorkerPool};
use ytfetch_core::config;
use ytfetch_core::control::StopSignal;

use super::build_downloader;
use crate::cli::interrupt::run_interruptible;
use crate::cli::Cli;

pub async fn run_batch_file(cli: &Cli, path: &Path) -> Result<ExitCode> {
    if !path.exists() {
        tracing::error!("Batch file not found: {}", path.display());
        return Ok(ExitCode::FAILURE);
    }

    let cfg = config::load_or_init()?;
    tracing::debug!("loaded config: {:?}", cfg);

    let workers = cli
        .workers
        .map(usize::from)
        .or(cfg.workers)
        .unwrap_or_else(batch::default_workers)
        .max(1);
    let stop = StopSignal::new();
    let pool: Box<dyn WorkerPool> = match cli.execution_mode() {
        ExecutionMode::Threads => {
            let runner = build_downloader(&cfg, stop.clone());
            Box::new(ThreadPool::new(Arc::new(runner), workers))
        }
        ExecutionMode::Processes => Box::new(
            ProcessPool::current_exe(workers).context("locating the ytfetch executable for worker processes")?,
        ),
    };

    let settings = BatchSettings {
        resolution: cli.resolution.clone(),
        output_format: cli.format.clone(),
        extract_audio: cli.audio,
        proxy: cli.proxy.clone(),
    };
    let path = path.to_path_buf();
    let pool_stop = stop.clone();
    let (report, interrupted) = run_interruptible(stop, move || {
        batch::run_batch(&path, &settings, pool.as_ref(), &pool_stop)
    })
    .await?;

    if interrupted {
        if let Some(report) = &report {
            tracing::info!(
                "Batch interrupted: {} of {} job(s) finished",
                report.total(),
                report.dispatched
            );
        }
        tracing::info!("Download interrupted by user");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
