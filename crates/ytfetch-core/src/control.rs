//! Run control for interrupts: a shared stop signal.
//!
//! When the user presses Ctrl-C the CLI trips the signal. Worker pools stop
//! taking queued jobs, and retry pauses wake up early and abandon the
//! remaining attempts. In-flight extractor processes are not killed here;
//! they receive the same terminal interrupt.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct Inner {
    stopped: Mutex<bool>,
    cv: Condvar,
}

/// Cloneable stop flag with an interruptible sleep.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    inner: Arc<Inner>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request stop and wake every sleeper.
    pub fn trigger(&self) {
        let mut stopped = self.inner.stopped.lock().unwrap_or_else(|e| e.into_inner());
        *stopped = true;
        self.inner.cv.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        *self.inner.stopped.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Sleep for `d` unless stop is requested first.
    /// Returns `true` if the full duration elapsed, `false` when stopped.
    pub fn sleep(&self, d: Duration) -> bool {
        let deadline = Instant::now() + d;
        let mut stopped = self.inner.stopped.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            if *stopped {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            stopped = match self.inner.cv.wait_timeout(stopped, deadline - now) {
                Ok((guard, _)) => guard,
                Err(e) => e.into_inner().0,
            };
        }
    }
}
