//! Worker pools: execute many jobs with bounded concurrency.
//!
//! The orchestrator only sees [`WorkerPool`]; which kind of execution unit
//! runs a job (an OS thread in this process, or a child process) is chosen
//! once by the caller via [`ExecutionMode`].

mod process;
mod queue;
mod threads;

pub use process::{parse_worker_output, ProcessPool, RUN_JOB_FLAG};
pub use queue::run_bounded;
pub use threads::ThreadPool;

use std::fmt;

use crate::control::StopSignal;
use crate::job::{DownloadRequest, JobOutcome};

/// How batch jobs are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    #[default]
    Threads,
    Processes,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Threads => write!(f, "threads"),
            ExecutionMode::Processes => write!(f, "processes"),
        }
    }
}

/// Runs a set of jobs with at most `workers()` in flight.
pub trait WorkerPool: Send + Sync {
    fn mode(&self) -> ExecutionMode;

    fn workers(&self) -> usize;

    /// Run every request and hand each outcome to `on_outcome` as jobs
    /// complete (completion order, not submission order). Once `stop` is
    /// tripped no further queued request is started; requests never started
    /// produce no outcome.
    fn execute(
        &self,
        requests: Vec<DownloadRequest>,
        stop: &StopSignal,
        on_outcome: &mut dyn FnMut(JobOutcome),
    );
}
