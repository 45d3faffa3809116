//! Retry loop: run a closure until success or the policy says stop.

use std::fmt::Display;
use std::time::Duration;

use super::policy::{RetryDecision, RetryPolicy};

/// Runs `attempt` until it succeeds or the policy is exhausted, sleeping the
/// current thread between attempts. The final error is returned unchanged.
pub fn run_with_retry<T, E, F>(policy: &RetryPolicy, attempt: F) -> Result<T, E>
where
    E: Display,
    F: FnMut(u32) -> Result<T, E>,
{
    run_with_retry_using(
        policy,
        |d| {
            std::thread::sleep(d);
            true
        },
        attempt,
    )
}

/// Like [`run_with_retry`] but with an injected pause. `pause` returns `false`
/// to abandon the remaining attempts (e.g. after Ctrl-C); the last error is
/// then returned as-is.
pub fn run_with_retry_using<T, E, F, P>(policy: &RetryPolicy, mut pause: P, mut attempt: F) -> Result<T, E>
where
    E: Display,
    F: FnMut(u32) -> Result<T, E>,
    P: FnMut(Duration) -> bool,
{
    let mut n = 1u32;
    loop {
        match attempt(n) {
            Ok(v) => return Ok(v),
            Err(e) => match policy.decide(n) {
                RetryDecision::NoRetry => {
                    if policy.max_attempts > 1 {
                        tracing::error!("Final attempt failed: {}", e);
                    }
                    return Err(e);
                }
                RetryDecision::RetryAfter(d) => {
                    tracing::warn!(
                        "Attempt {} failed: {}. Retrying in {}s...",
                        n,
                        e,
                        d.as_secs_f64()
                    );
                    if !pause(d) {
                        tracing::info!("retry abandoned after attempt {}", n);
                        return Err(e);
                    }
                    n += 1;
                }
            },
        }
    }
}
