//! Job configuration builder: translates a [`DownloadRequest`] into the
//! option set handed to the extractor.
//!
//! Two shapes exist. Audio mode asks only for the best audio stream and
//! transcodes it with ffmpeg. Video mode asks for best video (optionally
//! height-capped) plus best audio and merges them into the requested
//! container. The media binary is located first so a missing ffmpeg fails
//! the job before any network work starts.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::FetchError;
use crate::job::{DownloadRequest, Resolution};
use crate::locator::Locate;

/// Fixed audio transcode quality in kbps.
pub const AUDIO_QUALITY_KBPS: u32 = 192;

/// Title-based filename pattern appended to the output directory.
pub const OUTPUT_PATTERN: &str = "%(title)s.%(ext)s";

/// Audio post-processing step (extract audio then transcode).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioExtraction {
    pub codec: String,
    pub quality_kbps: u32,
}

/// Everything the extractor needs for one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorOptions {
    /// yt-dlp format selector.
    pub format: String,
    pub output_template: PathBuf,
    pub ffmpeg_location: PathBuf,
    pub proxy: Option<String>,
    /// Set in audio mode only.
    pub extract_audio: Option<AudioExtraction>,
    /// Container for merged video+audio; video mode only.
    pub merge_output_format: Option<String>,
    pub no_playlist: bool,
    /// Skip failing entries instead of aborting; playlist jobs only.
    pub ignore_errors: bool,
    pub quiet: bool,
}

impl ExtractorOptions {
    /// Render as yt-dlp command-line arguments (without the URL).
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            self.format.clone(),
            "-o".to_string(),
            self.output_template.to_string_lossy().into_owned(),
            "--ffmpeg-location".to_string(),
            self.ffmpeg_location.to_string_lossy().into_owned(),
        ];
        if self.quiet {
            args.push("--quiet".to_string());
            // --quiet also hides progress; keep the progress template lines flowing.
            args.push("--progress".to_string());
        }
        if let Some(proxy) = &self.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }
        if let Some(audio) = &self.extract_audio {
            args.push("-x".to_string());
            args.push("--audio-format".to_string());
            args.push(audio.codec.clone());
            args.push("--audio-quality".to_string());
            args.push(format!("{}K", audio.quality_kbps));
        }
        if let Some(container) = &self.merge_output_format {
            args.push("--merge-output-format".to_string());
            args.push(container.clone());
        }
        if self.no_playlist {
            args.push("--no-playlist".to_string());
        } else {
            args.push("--yes-playlist".to_string());
        }
        if self.ignore_errors {
            args.push("--ignore-errors".to_string());
        }
        args
    }
}

/// Format selector for video mode.
pub fn video_format_selector(resolution: Resolution) -> String {
    match resolution {
        Resolution::MaxHeight(h) => {
            format!("bestvideo[height<={h}]+bestaudio/best[height<={h}]")
        }
        Resolution::Best => "bestvideo+bestaudio/best".to_string(),
    }
}

/// Builds [`ExtractorOptions`]; holds the injected output directory and locator.
#[derive(Clone)]
pub struct OptionsBuilder {
    locator: Arc<dyn Locate>,
    output_dir: PathBuf,
}

impl OptionsBuilder {
    pub fn new(locator: Arc<dyn Locate>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            locator,
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Build the options for one request. Fails with
    /// [`FetchError::MissingDependency`] when no usable ffmpeg is found.
    pub fn build(&self, request: &DownloadRequest) -> Result<ExtractorOptions, FetchError> {
        let location = self.locator.locate();
        let Some(ffmpeg) = location.usable_path() else {
            return Err(FetchError::MissingDependency {
                binary: self.locator.binary_name().to_string(),
                hint: self.locator.install_hint(),
            });
        };

        let mut opts = ExtractorOptions {
            format: String::new(),
            output_template: self.output_dir.join(OUTPUT_PATTERN),
            ffmpeg_location: ffmpeg.to_path_buf(),
            proxy: request.proxy.clone(),
            extract_audio: None,
            merge_output_format: None,
            no_playlist: !request.is_playlist,
            ignore_errors: false,
            quiet: true,
        };

        if request.extract_audio {
            opts.format = "bestaudio".to_string();
            opts.extract_audio = Some(AudioExtraction {
                codec: request.output_format.clone(),
                quality_kbps: AUDIO_QUALITY_KBPS,
            });
            return Ok(opts);
        }

        opts.format = video_format_selector(request.resolution);
        opts.merge_output_format = Some(request.output_format.clone());
        opts.ignore_errors = request.is_playlist;
        Ok(opts)
    }
}
