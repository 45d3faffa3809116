//! CLI command handlers, one file per route.

mod batch;
mod single;
mod worker;

pub use batch::run_batch_file;
pub use single::run_single;
pub use worker::run_worker;

use std::sync::Arc;
use ytfetch_core::config::YtfetchConfig;
use ytfetch_core::control::StopSignal;
use ytfetch_core::extractor::YtDlp;
use ytfetch_core::job::Downloader;
use ytfetch_core::locator::{CachedLocator, FfmpegLocator};
use ytfetch_core::options::OptionsBuilder;

/// Production runner wired from config: cached ffmpeg lookup, yt-dlp, retry policy.
fn build_downloader(cfg: &YtfetchConfig, stop: StopSignal) -> Downloader {
    let locator = Arc::new(CachedLocator::new(FfmpegLocator::new(cfg.ffmpeg_path.clone())));
    let options = OptionsBuilder::new(locator, cfg.resolved_output_dir());
    let extractor = Arc::new(YtDlp::new(cfg.ytdlp_program()));
    Downloader::new(options, extractor)
        .with_retry(cfg.retry_policy())
        .with_stop(stop)
}
