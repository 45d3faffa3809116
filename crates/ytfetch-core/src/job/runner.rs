//! Single-job runner: build options, run the extractor, retry on failure.

use std::sync::Arc;

use crate::control::StopSignal;
use crate::error::FetchError;
use crate::extractor::{notify_hook, Extractor, LogProgress, ProgressHook};
use crate::options::{ExtractorOptions, OptionsBuilder};
use crate::retry::{run_with_retry_using, RetryPolicy};

use super::DownloadRequest;

/// Runs one job to completion. A job is binary: success or a single error.
pub trait JobRunner: Send + Sync {
    fn run(&self, request: &DownloadRequest) -> Result<(), FetchError>;
}

/// The production runner: options builder + extractor + progress hook + retry policy.
#[derive(Clone)]
pub struct Downloader {
    options: OptionsBuilder,
    extractor: Arc<dyn Extractor>,
    hook: Arc<dyn ProgressHook>,
    retry: RetryPolicy,
    stop: StopSignal,
}

impl Downloader {
    pub fn new(options: OptionsBuilder, extractor: Arc<dyn Extractor>) -> Self {
        Self {
            options,
            extractor,
            hook: Arc::new(LogProgress::default()),
            retry: RetryPolicy::default(),
            stop: StopSignal::new(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_hook(mut self, hook: Arc<dyn ProgressHook>) -> Self {
        self.hook = hook;
        self
    }

    /// Share a stop signal; once tripped, pending retries are abandoned.
    pub fn with_stop(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// One extractor call; no retry.
    fn attempt(&self, url: &str, options: &ExtractorOptions) -> Result<(), FetchError> {
        let hook = self.hook.as_ref();
        self.extractor
            .download(url, options, &mut |event| notify_hook(hook, url, &event))
            .map_err(|e| FetchError::download(url, e.to_string()))
    }
}

impl JobRunner for Downloader {
    fn run(&self, request: &DownloadRequest) -> Result<(), FetchError> {
        if self.stop.is_stopped() {
            return Err(FetchError::Interrupted);
        }
        // Missing ffmpeg is fatal for the job and is not retried.
        let options = self.options.build(request)?;
        let url = request.url.as_str();
        run_with_retry_using(
            &self.retry,
            |delay| self.stop.sleep(delay),
            |_| self.attempt(url, &options),
        )
        .inspect_err(|e| tracing::error!("Download failed for {}: {}", url, e))
    }
}
