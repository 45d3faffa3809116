//! Process pool: each job runs in a child process of this executable.
//!
//! A bounded set of supervisor threads each spawns
//! `<program> <base args> --run-job <request json>`, waits for it, and reads
//! the child's [`JobOutcome`] from the last JSON line on its stdout. The
//! child's stderr (its log output) is inherited. A child that crashes or
//! prints nothing usable is reported from its exit status.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

use super::queue::run_bounded;
use super::{ExecutionMode, WorkerPool};
use crate::control::StopSignal;
use crate::job::{DownloadRequest, JobOutcome};

/// Hidden CLI flag the worker child is started with.
pub const RUN_JOB_FLAG: &str = "--run-job";

pub struct ProcessPool {
    program: PathBuf,
    base_args: Vec<OsString>,
    workers: usize,
}

impl ProcessPool {
    pub fn new(program: impl Into<PathBuf>, workers: usize) -> Self {
        Self {
            program: program.into(),
            base_args: Vec::new(),
            workers: workers.max(1),
        }
    }

    /// Pool that re-executes the running binary.
    pub fn current_exe(workers: usize) -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_exe()?, workers))
    }

    /// Arguments placed before the `--run-job` flag.
    pub fn with_base_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.base_args = args.into_iter().map(Into::into).collect();
        self
    }

    fn run_child(program: &Path, base_args: &[OsString], request: &DownloadRequest) -> JobOutcome {
        let payload = match serde_json::to_string(request) {
            Ok(p) => p,
            Err(e) => return JobOutcome::failure(&request.url, format!("could not encode job: {e}")),
        };
        let output = Command::new(program)
            .args(base_args)
            .arg(RUN_JOB_FLAG)
            .arg(payload)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output();
        match output {
            Ok(out) => {
                let stdout = String::from_utf8_lossy(&out.stdout);
                parse_worker_output(&request.url, &stdout).unwrap_or_else(|| {
                    if out.status.success() {
                        JobOutcome::success(&request.url)
                    } else {
                        JobOutcome::failure(
                            &request.url,
                            format!("worker process exited with {}", out.status),
                        )
                    }
                })
            }
            Err(e) => JobOutcome::failure(
                &request.url,
                format!("could not start worker {}: {}", program.display(), e),
            ),
        }
    }
}

/// Last stdout line that parses as a [`JobOutcome`] for `url`.
pub fn parse_worker_output(url: &str, stdout: &str) -> Option<JobOutcome> {
    stdout
        .lines()
        .rev()
        .filter_map(|line| serde_json::from_str::<JobOutcome>(line.trim()).ok())
        .find(|o| o.url == url)
}

impl WorkerPool for ProcessPool {
    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Processes
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
        let program = self.program.clone();
        let base_args = self.base_args.clone();
        let task = Arc::new(move |request: &DownloadRequest| {
            ProcessPool::run_child(&program, &base_args, request)
        });
        run_bounded(self.workers, requests, stop, task, on_outcome);
    }
}
