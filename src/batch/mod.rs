//! Batched execution of remote profile operations.
//!
//! A batch is a list of work items driven through a caller-supplied
//! operation under a bounded concurrency window, with per-item retry, a
//! partitioned result, and an optional aggregate analysis of the failures.

pub mod analyzer;
pub mod executor;
pub mod outcome;

pub use analyzer::{analyze, BatchAnalysis, FailurePattern};
pub use executor::BatchExecutor;
pub use outcome::{BatchFailure, BatchResult, BatchSuccess, OperationOutcome, WorkItem};
