//! Error classification for remote profile operations.
//!
//! Failures reach this module as an `ErrorSignal` (a numeric result code
//! from a response, or a transport fault message) and leave as an
//! `ErrorClassification` with category, severity, retryability, and
//! troubleshooting guidance. Two lookup paths feed the same output shape:
//! a fixed code table and an ordered transport-pattern list.

pub mod classification;
pub mod codes;
pub mod detector;

pub use classification::{
    classify, troubleshooting_steps, ErrorCategory, ErrorClassification, ErrorSignal,
    RetryStrategy, Severity,
};
pub use codes::{code_name, SUCCESS_CODE};
