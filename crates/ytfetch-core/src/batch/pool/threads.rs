//! Thread pool: jobs run in-process on a bounded set of OS threads.

use std::sync::Arc;

use super::queue::run_bounded;
use super::{ExecutionMode, WorkerPool};
use crate::control::StopSignal;
use crate::job::{DownloadRequest, JobOutcome, JobRunner};

pub struct ThreadPool {
    runner: Arc<dyn JobRunner>,
    workers: usize,
}

impl ThreadPool {
    pub fn new(runner: Arc<dyn JobRunner>, workers: usize) -> Self {
        Self {
            runner,
            workers: workers.max(1),
        }
    }
}

impl WorkerPool for ThreadPool {
    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Threads
    }

    fn workers(&self) -> usize {
        self.workers
    }

    fn execute(
        &self,
        requests: Vec<DownloadRequest>,
        stop: &StopSignal,
        on_outcome: &mut dyn FnMut(JobOutcome),
    ) {
        let runner = Arc::clone(&self.runner);
        let task = Arc::new(move |request: &DownloadRequest| {
            JobOutcome::from_result(&request.url, runner.run(request))
        });
        run_bounded(self.workers, requests, stop, task, on_outcome);
    }
}
