//! Shared bounded worker loop used by both pool kinds.

use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use crate::control::StopSignal;
use crate::job::{DownloadRequest, JobOutcome};

/// Start `workers` threads that pull requests from a shared queue and run
/// `task` on each. Outcomes are delivered on the calling thread in the order
/// they complete. A panicking task becomes a failed outcome for its URL.
pub fn run_bounded<F>(
    workers: usize,
    requests: Vec<DownloadRequest>,
    stop: &StopSignal,
    task: Arc<F>,
    on_outcome: &mut dyn FnMut(JobOutcome),
) where
    F: Fn(&DownloadRequest) -> JobOutcome + Send + Sync + 'static,
{
    let count = requests.len();
    if count == 0 {
        return;
    }
    let work: Arc<Mutex<VecDeque<DownloadRequest>>> =
        Arc::new(Mutex::new(requests.into_iter().collect()));
    let (tx, rx) = mpsc::channel::<JobOutcome>();
    let num_workers = workers.max(1).min(count);
    let mut handles = Vec::with_capacity(num_workers);
    for _ in 0..num_workers {
        let work = Arc::clone(&work);
        let tx = tx.clone();
        let stop = stop.clone();
        let task = Arc::clone(&task);
        handles.push(std::thread::spawn(move || loop {
            if stop.is_stopped() {
                break;
            }
            let next = work.lock().unwrap_or_else(|e| e.into_inner()).pop_front();
            let Some(request) = next else {
                break;
            };
            let outcome = catch_unwind(AssertUnwindSafe(|| task(&request))).unwrap_or_else(|_| {
                JobOutcome::failure(request.url.clone(), "job panicked")
            });
            if tx.send(outcome).is_err() {
                break;
            }
        }));
    }
    drop(tx);

    // Ends when every worker has exited and dropped its sender.
    for outcome in rx {
        on_outcome(outcome);
    }

    for h in handles {
        if h.join().is_err() {
            tracing::error!("batch worker thread panicked");
        }
    }

    let skipped = work.lock().unwrap_or_else(|e| e.into_inner()).len();
    if skipped > 0 {
        tracing::warn!("{} queued job(s) not started", skipped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn requests(n: usize) -> Vec<DownloadRequest> {
        (0..n)
            .map(|i| DownloadRequest::new(format!("https://example.com/{i}")))
            .collect()
    }

    #[test]
    fn every_request_yields_one_outcome() {
        let mut seen = Vec::new();
        run_bounded(
            3,
            requests(10),
            &StopSignal::new(),
            Arc::new(|r: &DownloadRequest| JobOutcome::success(r.url.clone())),
            &mut |o| seen.push(o.url),
        );
        seen.sort();
        let mut expected: Vec<String> = (0..10).map(|i| format!("https://example.com/{i}")).collect();
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[test]
    fn concurrency_is_bounded_by_worker_count() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (a, p) = (Arc::clone(&active), Arc::clone(&peak));
        let task = Arc::new(move |r: &DownloadRequest| {
            let now = a.fetch_add(1, Ordering::SeqCst) + 1;
            p.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            a.fetch_sub(1, Ordering::SeqCst);
            JobOutcome::success(r.url.clone())
        });
        let mut n = 0;
        run_bounded(2, requests(8), &StopSignal::new(), task, &mut |_| n += 1);
        assert_eq!(n, 8);
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn panicking_task_becomes_failure() {
        let task = Arc::new(|r: &DownloadRequest| {
            if r.url.ends_with("/1") {
                panic!("worker bug");
            }
            JobOutcome::success(r.url.clone())
        });
        let mut failed = Vec::new();
        let mut ok = 0;
        run_bounded(2, requests(3), &StopSignal::new(), task, &mut |o| {
            if o.succeeded {
                ok += 1;
            } else {
                failed.push(o.url);
            }
        });
        assert_eq!(ok, 2);
        assert_eq!(failed, vec!["https://example.com/1".to_string()]);
    }

    #[test]
    fn stop_prevents_new_jobs() {
        let stop = StopSignal::new();
        let s = stop.clone();
        let task = Arc::new(move |r: &DownloadRequest| {
            s.trigger();
            JobOutcome::success(r.url.clone())
        });
        let mut n = 0;
        run_bounded(1, requests(5), &stop, task, &mut |_| n += 1);
        assert_eq!(n, 1);
    }
}
