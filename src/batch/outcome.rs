//! Batch input and outcome types.

use crate::retry::OperationError;

/// One unit of batch input. The executor only needs a stable identifier;
/// everything else about the item is opaque to it.
pub trait WorkItem {
    /// Stable identifier for reporting and aggregation.
    fn id(&self) -> &str;
}

impl WorkItem for String {
    fn id(&self) -> &str {
        self
    }
}

impl WorkItem for &str {
    fn id(&self) -> &str {
        self
    }
}

/// A resolved item that succeeded.
#[derive(Clone, Debug)]
pub struct BatchSuccess<I, T> {
    pub item: I,
    pub result: T,
}

/// A resolved item that failed after its retries were spent or its failure
/// was classified as non-retryable.
#[derive(Clone, Debug)]
pub struct BatchFailure<I> {
    pub item: I,
    pub error: OperationError,
}

/// The outcome of one item. Exactly one variant per item per batch;
/// intermediate failures of retried items are not represented here.
#[derive(Clone, Debug)]
pub enum OperationOutcome<I, T> {
    Success(BatchSuccess<I, T>),
    Failure(BatchFailure<I>),
}

/// The complete partition of a batch into successes and failures.
///
/// Owned by the caller once the batch resolves. The partition invariant is
/// structural: `total()` is defined as the sum of both lists, and each
/// submitted item lands in exactly one of them. A cancelled batch stops
/// dispatching at a window boundary; items never dispatched appear in
/// neither list and `cancelled` is set.
#[derive(Clone, Debug, Default)]
pub struct BatchResult<I, T> {
    pub successes: Vec<BatchSuccess<I, T>>,
    pub failures: Vec<BatchFailure<I>>,
    pub cancelled: bool,
}

impl<I, T> BatchResult<I, T> {
    pub(crate) fn empty() -> Self {
        Self {
            successes: Vec::new(),
            failures: Vec::new(),
            cancelled: false,
        }
    }

    pub(crate) fn push(&mut self, outcome: OperationOutcome<I, T>) {
        match outcome {
            OperationOutcome::Success(success) => self.successes.push(success),
            OperationOutcome::Failure(failure) => self.failures.push(failure),
        }
    }

    /// Number of items that resolved.
    pub fn total(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// True when every resolved item succeeded and nothing was cancelled.
    pub fn is_fully_successful(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }
}

impl<I: WorkItem, T> BatchResult<I, T> {
    /// Identifiers of the failed items, in resolution order.
    pub fn failed_ids(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.item.id()).collect()
    }
}
