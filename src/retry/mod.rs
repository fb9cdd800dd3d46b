//! Per-item retry coordination.
//!
//! Wraps a single remote operation in a classify-and-retry loop. Whether a
//! failure is retried, how many times, and with what delay all come from its
//! classification; the coordinator itself holds no policy beyond the loop.
//! Decisions are strictly per item: two items retrying at the same moment do
//! not coordinate their backoff.

use std::fmt;
use std::future::Future;

use crate::error::{classify, ErrorClassification, ErrorSignal};

/// The final failure of an operation, with its classification and the
/// number of attempts consumed.
#[derive(Clone, Debug)]
pub struct OperationError {
    /// The signal from the last attempt.
    pub signal: ErrorSignal,
    /// Classification of that signal.
    pub classification: ErrorClassification,
    /// Total attempts made, including the first.
    pub attempts: u32,
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} / {}, {} attempt{})",
            self.signal,
            self.classification.category,
            self.classification.severity,
            self.attempts,
            if self.attempts == 1 { "" } else { "s" }
        )
    }
}

impl std::error::Error for OperationError {}

/// Runs `op` on `item` until it succeeds or its retry budget is spent.
///
/// The operation runs at least once. On failure the signal is classified;
/// a non-retryable classification stops immediately, otherwise the
/// coordinator sleeps for the classification's linear backoff delay and
/// tries again, up to `1 + max_retries` attempts in total. The budget is
/// re-read from each failure's own classification, so a failure mode that
/// changes mid-item changes the budget with it.
pub async fn run_with_retry<I, T, F, Fut>(item: &I, op: &F) -> Result<T, OperationError>
where
    I: Clone,
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<T, ErrorSignal>>,
{
    let mut attempt: u32 = 1;
    loop {
        match op(item.clone()).await {
            Ok(result) => return Ok(result),
            Err(signal) => {
                let classification = classify(&signal);
                match classification.retry_strategy {
                    Some(strategy) if classification.retryable && attempt <= strategy.max_retries => {
                        let delay = strategy.delay_for(attempt);
                        tracing::warn!(
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            category = %classification.category,
                            "operation failed, retrying: {}",
                            signal
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    _ => {
                        return Err(OperationError {
                            signal,
                            classification,
                            attempts: attempt,
                        });
                    }
                }
            }
        }
    }
}
