//! Retry and backoff policy.
//!
//! A job is retried as a whole: the policy does not classify failures, it
//! only decides whether another attempt is allowed and how long to wait
//! before it. The loop in `run` is generic over the attempt's result type so
//! the job runner and tests share one implementation.

mod policy;
mod run;

pub use policy::{RetryDecision, RetryPolicy};
pub use run::{run_with_retry, run_with_retry_using};
