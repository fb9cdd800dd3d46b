//! profilebridge - MCP bridge for batched browser-profile lifecycle
//! management.
//!
//! The bridge sits between an automated caller (an MCP client) and a remote
//! browser-profile service that fails intermittently and speaks a rich but
//! inconsistent numeric error vocabulary. Lifecycle operations fan out over
//! bounded concurrency windows, failures are classified into a fixed
//! taxonomy that drives per-item retry, and completed batches can be
//! analyzed for repeated failure patterns and remediation guidance.

pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod mcp;
pub mod report;
pub mod retry;
