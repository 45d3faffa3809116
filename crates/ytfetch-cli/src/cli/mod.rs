//! CLI for ytfetch.

mod commands;
mod interrupt;

use anyhow::Result;
use clap::{ArgAction, CommandFactory, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use ytfetch_core::batch::ExecutionMode;
use ytfetch_core::job::DownloadRequest;

use commands::{run_batch_file, run_single, run_worker};

const ABOUT: &str = "\
YTFETCH - YouTube Video Downloader

Download videos, playlists, and extract audio from YouTube (and every other
site yt-dlp supports). Files are written to your Desktop unless `output_dir`
is set in the config file.";

/// Top-level CLI for ytfetch.
#[derive(Debug, Parser)]
#[command(name = "ytfetch", version, disable_version_flag = true)]
#[command(about = ABOUT, long_about = None)]
#[command(override_usage = "ytfetch [OPTIONS] URL\n       ytfetch -b BATCH_FILE [OPTIONS]")]
pub struct Cli {
    /// Video or playlist URL.
    #[arg(value_name = "URL")]
    pub url: Option<String>,

    /// Show version information.
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    #[allow(dead_code)]
    version: Option<bool>,

    /// Extract audio only.
    #[arg(short, long)]
    pub audio: bool,

    /// Download the full playlist.
    #[arg(short, long)]
    pub playlist: bool,

    /// Video quality (1080, 720, best, max).
    #[arg(short, long, default_value = "best", value_name = "RES")]
    pub resolution: String,

    /// Output format (mp4, webm, mp3).
    #[arg(short, long, default_value = "mp4", value_name = "FMT")]
    pub format: String,

    /// Batch download from a text file with one URL per line.
    #[arg(short, long, value_name = "FILE")]
    pub batch: Option<PathBuf>,

    /// Proxy server for downloads.
    #[arg(short = 'x', long, value_name = "URL")]
    pub proxy: Option<String>,

    /// Run batch downloads on threads (default).
    #[arg(short = 'm', long, conflicts_with = "multiprocessing")]
    pub multithreading: bool,

    /// Run batch downloads in separate processes.
    #[arg(short = 'M', long)]
    pub multiprocessing: bool,

    /// Number of parallel downloads (default: CPU count).
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub workers: Option<u16>,

    /// Internal: run one JSON-encoded job as a process-pool worker.
    #[arg(long = "run-job", hide = true, value_name = "JSON")]
    pub run_job: Option<String>,
}

/// What to do for a parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Help,
    Worker(String),
    Batch(PathBuf),
    Single(DownloadRequest),
}

impl Cli {
    /// Batch wins over a positional URL; with neither, show help.
    pub fn route(&self) -> Route {
        if let Some(json) = &self.run_job {
            return Route::Worker(json.clone());
        }
        if let Some(path) = &self.batch {
            return Route::Batch(path.clone());
        }
        match &self.url {
            Some(url) => Route::Single(
                DownloadRequest::new(url.as_str())
                    .with_resolution(&self.resolution)
                    .with_output_format(self.format.clone())
                    .with_extract_audio(self.audio)
                    .with_playlist(self.playlist)
                    .with_proxy(self.proxy.clone()),
            ),
            None => Route::Help,
        }
    }

    pub fn execution_mode(&self) -> ExecutionMode {
        if self.multiprocessing {
            ExecutionMode::Processes
        } else {
            ExecutionMode::Threads
        }
    }
}

pub fn print_help() -> ExitCode {
    let mut cmd = Cli::command();
    if cmd.print_help().is_err() {
        return ExitCode::FAILURE;
    }
    println!();
    ExitCode::SUCCESS
}

pub async fn dispatch(cli: Cli, route: Route) -> Result<ExitCode> {
    match route {
        Route::Help => Ok(print_help()),
        Route::Worker(json) => run_worker(&json).await,
        Route::Batch(path) => run_batch_file(&cli, &path).await,
        Route::Single(request) => run_single(request).await,
    }
}

#[cfg(test)]
mod tests;
