//! Ctrl-C handling around blocking work.
//!
//! The blocking closure runs on tokio's blocking pool while the CLI waits for
//! either its result or an interrupt. On the first interrupt the shared
//! [`StopSignal`] is tripped and the closure is awaited so running jobs can
//! wind down; a second interrupt exits immediately.

use anyhow::Result;
use ytfetch_core::control::StopSignal;

/// Run `f` to completion. Returns its value and whether an interrupt arrived.
pub async fn run_interruptible<T, F>(stop: StopSignal, f: F) -> Result<(T, bool)>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let mut handle = tokio::task::spawn_blocking(f);
    tokio::select! {
        res = &mut handle => Ok((res?, false)),
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupt received; no new jobs will start, waiting for running jobs to stop");
            stop.trigger();
            tokio::select! {
                res = &mut handle => Ok((res?, true)),
                _ = tokio::signal::ctrl_c() => {
                    tracing::error!("Second interrupt; exiting now");
                    std::process::exit(1);
                }
            }
        }
    }
}
