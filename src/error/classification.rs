//! Error classification types for remote profile operations.
//!
//! Every failure coming back from the profile service, whether a numeric
//! result code or a transport-level fault, is mapped to a fixed
//! `ErrorClassification` record carrying category, severity, retryability,
//! and troubleshooting guidance. Classification is a pure function of the
//! signal: the same signal always classifies identically, so the record is
//! derived on demand and never stored.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::codes;
use super::detector;

/// The raw input to classification.
///
/// A remote response that resolved carries a numeric result code (0 means
/// success and is never presented here by the executor); a call that never
/// resolved to a response carries the transport fault text instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorSignal {
    /// A response from the service with a non-success result code.
    Coded { code: i64, message: String },
    /// A transport-level fault (connection refused, DNS failure, timeout).
    Transport { message: String },
}

impl ErrorSignal {
    /// Builds a coded signal.
    pub fn coded(code: i64, message: impl Into<String>) -> Self {
        Self::Coded {
            code,
            message: message.into(),
        }
    }

    /// Builds a transport-fault signal.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// The human-readable message carried by the signal.
    pub fn message(&self) -> &str {
        match self {
            Self::Coded { message, .. } => message,
            Self::Transport { message } => message,
        }
    }

    /// The numeric result code, if the signal came from a response.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Coded { code, .. } => Some(*code),
            Self::Transport { .. } => None,
        }
    }
}

impl fmt::Display for ErrorSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coded { code, message } => write!(f, "code {}: {}", code, message),
            Self::Transport { message } => write!(f, "transport fault: {}", message),
        }
    }
}

/// The failure category. Closed set; every signal maps to exactly one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCategory {
    /// Connectivity problems between the bridge and the service.
    Network,
    /// Rejected or missing credentials.
    Authentication,
    /// Invalid request parameters or local misconfiguration.
    Configuration,
    /// Missing, conflicting, or exhausted profile resources.
    Resource,
    /// Service-side failures.
    Server,
    /// Failures while launching or tearing down a browser instance.
    BrowserLifecycle,
    /// Failures in the proxy chain a profile is configured to use.
    Proxy,
    /// Anything the tables do not recognize.
    Unknown,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Network => "network",
            Self::Authentication => "authentication",
            Self::Configuration => "configuration",
            Self::Resource => "resource",
            Self::Server => "server",
            Self::BrowserLifecycle => "browser-lifecycle",
            Self::Proxy => "proxy",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", label)
    }
}

/// How urgently a failure needs attention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        };
        write!(f, "{}", label)
    }
}

/// Backoff parameters for a retryable classification.
///
/// Backoff is linear: the delay before retrying after failed attempt `n` is
/// `base_delay * n`. The dominant retryable failures here are
/// connection-transient or capacity-adjacent, where longer exponential waits
/// cost latency without improving the odds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryStrategy {
    /// Delay unit for the first retry.
    pub base_delay: Duration,
    /// Retries allowed after the initial attempt.
    pub max_retries: u32,
}

impl RetryStrategy {
    /// Creates a strategy with the given base delay and retry budget.
    pub fn new(base_delay: Duration, max_retries: u32) -> Self {
        Self {
            base_delay,
            max_retries,
        }
    }

    /// Delay before the retry that follows failed attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt.max(1))
    }

    /// The per-category strategy table.
    ///
    /// Categories not listed fall back to one conservative retry.
    pub fn for_category(category: ErrorCategory) -> Self {
        match category {
            ErrorCategory::Network => Self::new(Duration::from_millis(2000), 3),
            ErrorCategory::Server => Self::new(Duration::from_millis(5000), 2),
            ErrorCategory::BrowserLifecycle => Self::new(Duration::from_millis(1000), 1),
            _ => Self::new(Duration::from_millis(1000), 1),
        }
    }
}

/// The derived description of a failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorClassification {
    /// Failure category.
    pub category: ErrorCategory,
    /// How urgently the failure needs attention.
    pub severity: Severity,
    /// Whether the same operation may succeed if attempted again.
    pub retryable: bool,
    /// Backoff parameters; present exactly when `retryable` is true.
    pub retry_strategy: Option<RetryStrategy>,
    /// Ordered remediation steps for a human or automated caller.
    pub troubleshooting: Vec<String>,
}

impl ErrorClassification {
    /// Builds a classification, deriving the retry strategy from the
    /// category when the failure is retryable.
    pub fn new(
        category: ErrorCategory,
        severity: Severity,
        retryable: bool,
        troubleshooting: &[&str],
    ) -> Self {
        Self {
            category,
            severity,
            retryable,
            retry_strategy: retryable.then(|| RetryStrategy::for_category(category)),
            troubleshooting: troubleshooting.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Returns true if this failure demands immediate attention.
    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }

    /// A one-line human-readable description of the failure class.
    pub fn explain(&self) -> String {
        let kind = match self.category {
            ErrorCategory::Network => {
                "a connectivity problem between the bridge and the profile service"
            }
            ErrorCategory::Authentication => "rejected credentials",
            ErrorCategory::Configuration => "invalid request parameters or local configuration",
            ErrorCategory::Resource => "a missing, busy, or exhausted profile resource",
            ErrorCategory::Server => "a failure inside the profile service",
            ErrorCategory::BrowserLifecycle => {
                "a failure while starting or stopping a browser instance"
            }
            ErrorCategory::Proxy => "a failure in the profile's proxy chain",
            ErrorCategory::Unknown => "an unrecognized failure",
        };
        let action = if self.retryable {
            "it may resolve if the operation is retried"
        } else {
            "retrying will not help until the underlying cause is fixed"
        };
        format!("{} severity: {}; {}.", self.severity, kind, action)
    }
}

/// Classifies a failure signal. Pure and total: every signal, including
/// unrecognized ones, maps to a classification.
pub fn classify(signal: &ErrorSignal) -> ErrorClassification {
    match signal {
        ErrorSignal::Coded { code, message } => codes::classify_code(*code, message),
        ErrorSignal::Transport { message } => detector::classify_transport(message),
    }
}

/// Troubleshooting steps for a classified failure.
///
/// For a coded failure whose message also reads like a transport fault
/// (a 500 wrapping an upstream timeout, say), the matching transport hint
/// is prepended so the caller sees the more specific lead first.
pub fn troubleshooting_steps(
    classification: &ErrorClassification,
    signal: &ErrorSignal,
) -> Vec<String> {
    let mut steps = Vec::with_capacity(classification.troubleshooting.len() + 1);
    if let ErrorSignal::Coded { message, .. } = signal {
        if let Some(hint) = detector::transport_hint(message) {
            steps.push(hint);
        }
    }
    steps.extend(classification.troubleshooting.iter().cloned());
    steps
}
