//! Windowed batch execution.
//!
//! The executor drives a list of work items through a caller-supplied
//! operation, a fixed-size window at a time. Items inside a window run
//! concurrently through cooperative interleaving on the current task: every
//! operation's network wait is a suspension point, so siblings make progress
//! while one waits, but nothing runs on another thread and CPU-bound work
//! serializes. Window N+1 never starts before every item of window N has
//! resolved; that bound on concurrent load is the executor's only ordering
//! guarantee.
//!
//! Partial failure never aborts a batch. Each item resolves to success or
//! final failure independently and lands in the corresponding partition of
//! the result.
//!
//! Items in the same window that are backing off do so independently and can
//! retry in lockstep. There is no shared rate limiter; the inter-window
//! delay is the only burst control.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;

use crate::batch::outcome::{
    BatchFailure, BatchResult, BatchSuccess, OperationOutcome, WorkItem,
};
use crate::error::ErrorSignal;
use crate::retry::run_with_retry;

/// Drives batches of remote operations under a bounded concurrency window.
#[derive(Clone, Debug)]
pub struct BatchExecutor {
    window_size: usize,
    inter_window_delay: Duration,
    cancel: Option<watch::Receiver<bool>>,
}

impl BatchExecutor {
    /// Creates an executor with the given window size, no inter-window
    /// delay, and no cancellation channel.
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size: window_size.max(1),
            inter_window_delay: Duration::ZERO,
            cancel: None,
        }
    }

    /// Pause between windows, to avoid bursting the remote service.
    pub fn with_inter_window_delay(mut self, delay: Duration) -> Self {
        self.inter_window_delay = delay;
        self
    }

    /// Attach a cancellation signal. Cancellation is honored at window
    /// boundaries only: items already dispatched finish, no new window
    /// begins.
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Runs every item through `op`, retrying per classification, and
    /// returns the partitioned result.
    ///
    /// An empty item list resolves immediately; a window size larger than
    /// the list degenerates to a single window.
    pub async fn run<I, T, F, Fut>(&self, items: Vec<I>, op: F) -> BatchResult<I, T>
    where
        I: WorkItem + Clone,
        F: Fn(I) -> Fut,
        Fut: Future<Output = Result<T, ErrorSignal>>,
    {
        let mut result = BatchResult::empty();
        if items.is_empty() {
            return result;
        }

        let windows = items.chunks(self.window_size);
        let window_count = windows.len();
        for (index, window) in windows.enumerate() {
            if self.is_cancelled() {
                tracing::info!(
                    resolved = result.total(),
                    remaining = items.len() - result.total(),
                    "batch cancelled before window {}",
                    index + 1
                );
                result.cancelled = true;
                break;
            }
            if index > 0 && !self.inter_window_delay.is_zero() {
                tokio::time::sleep(self.inter_window_delay).await;
            }

            tracing::debug!(
                window = index + 1,
                windows = window_count,
                size = window.len(),
                "dispatching window"
            );
            let outcomes = futures::future::join_all(window.iter().map(|item| {
                let item = item.clone();
                let op = &op;
                async move {
                    match run_with_retry(&item, op).await {
                        Ok(value) => OperationOutcome::Success(BatchSuccess {
                            item,
                            result: value,
                        }),
                        Err(error) => {
                            tracing::warn!(
                                item = item.id(),
                                attempts = error.attempts,
                                category = %error.classification.category,
                                "item failed: {}",
                                error.signal
                            );
                            OperationOutcome::Failure(BatchFailure { item, error })
                        }
                    }
                }
            }))
            .await;

            for outcome in outcomes {
                result.push(outcome);
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    fn items(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("profile-{}", i)).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_batch_resolves_immediately() {
        let executor = BatchExecutor::new(5);
        let result: BatchResult<String, u32> =
            executor.run(vec![], |_item| async { Ok(1) }).await;
        assert_eq!(result.total(), 0);
        assert!(!result.cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_items_resolve_exactly_once() {
        let executor = BatchExecutor::new(3);
        let result = executor
            .run(items(8), |item: String| async move {
                if item.ends_with('4') {
                    Err(ErrorSignal::coded(404, "profile not found"))
                } else {
                    Ok(item.len())
                }
            })
            .await;

        assert_eq!(result.total(), 8);
        assert_eq!(result.success_count() + result.failure_count(), 8);

        let mut seen = HashSet::new();
        for success in &result.successes {
            assert!(seen.insert(success.item.clone()));
        }
        for failure in &result.failures {
            assert!(seen.insert(failure.item.clone()));
        }
        assert_eq!(seen.len(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_isolation() {
        // Every dispatch records which items had already resolved. For any
        // item of window two, all of window one must be in that set.
        let dispatched: Arc<Mutex<Vec<(String, usize)>>> = Arc::new(Mutex::new(Vec::new()));
        let resolved: Arc<Mutex<usize>> = Arc::new(Mutex::new(0));

        let executor = BatchExecutor::new(3);
        let dispatched_clone = dispatched.clone();
        let resolved_clone = resolved.clone();
        let result = executor
            .run(items(6), move |item: String| {
                let dispatched = dispatched_clone.clone();
                let resolved = resolved_clone.clone();
                async move {
                    dispatched
                        .lock()
                        .unwrap()
                        .push((item.clone(), *resolved.lock().unwrap()));
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    *resolved.lock().unwrap() += 1;
                    Ok::<_, ErrorSignal>(item)
                }
            })
            .await;

        assert_eq!(result.success_count(), 6);
        let dispatched = dispatched.lock().unwrap();
        for (item, resolved_before) in dispatched.iter() {
            let index: usize = item.trim_start_matches("profile-").parse().unwrap();
            if index > 3 {
                assert_eq!(
                    *resolved_before, 3,
                    "item {} dispatched before first window resolved",
                    item
                );
            } else {
                assert_eq!(*resolved_before, 0);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_oversized_window_is_single_window() {
        let executor = BatchExecutor::new(100);
        let result = executor
            .run(items(4), |item: String| async move { Ok::<_, ErrorSignal>(item) })
            .await;
        assert_eq!(result.success_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_failure_does_not_abort() {
        let executor = BatchExecutor::new(2);
        let result = executor
            .run(items(6), |item: String| async move {
                if item == "profile-1" {
                    // Non-retryable failure in the first window.
                    Err(ErrorSignal::coded(401, "unauthorized"))
                } else {
                    Ok(item)
                }
            })
            .await;

        assert_eq!(result.failure_count(), 1);
        assert_eq!(result.success_count(), 5);
        assert_eq!(result.failed_ids(), vec!["profile-1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_at_window_boundary() {
        let (tx, rx) = watch::channel(false);
        let executor = BatchExecutor::new(2).with_cancellation(rx);

        let result = executor
            .run(items(6), move |item: String| {
                let tx = tx.clone();
                async move {
                    // Cancel while the first window is in flight.
                    let _ = tx.send(true);
                    Ok::<_, ErrorSignal>(item)
                }
            })
            .await;

        assert!(result.cancelled);
        assert_eq!(result.total(), 2);
        assert_eq!(result.success_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_size_zero_is_clamped() {
        let executor = BatchExecutor::new(0);
        let result = executor
            .run(items(2), |item: String| async move { Ok::<_, ErrorSignal>(item) })
            .await;
        assert_eq!(result.success_count(), 2);
    }
}
