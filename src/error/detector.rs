//! Transport-fault pattern matching.
//!
//! Calls that never produce a response carry only a fault message. This
//! module matches that text against an ordered list of patterns, each fixing
//! its own category and troubleshooting. First match wins; a message no
//! pattern recognizes is treated as an unknown but probably transient fault.

use regex::Regex;
use std::sync::OnceLock;

use super::classification::{ErrorCategory, ErrorClassification, Severity};

/// A recognizer for one family of transport faults.
struct TransportPattern {
    regex: Regex,
    category: ErrorCategory,
    severity: Severity,
    retryable: bool,
    /// Short lead used when a coded failure wraps this fault kind.
    hint: &'static str,
    troubleshooting: &'static [&'static str],
}

impl TransportPattern {
    fn new(
        pattern: &str,
        category: ErrorCategory,
        severity: Severity,
        retryable: bool,
        hint: &'static str,
        troubleshooting: &'static [&'static str],
    ) -> Self {
        Self {
            regex: Regex::new(pattern).expect("transport pattern is valid"),
            category,
            severity,
            retryable,
            hint,
            troubleshooting,
        }
    }
}

/// Ordered matcher over the transport-fault patterns.
struct TransportMatcher {
    patterns: Vec<TransportPattern>,
}

impl TransportMatcher {
    fn new() -> Self {
        Self {
            patterns: vec![
                TransportPattern::new(
                    r"(?i)connection\s*refused",
                    ErrorCategory::Network,
                    Severity::High,
                    true,
                    "The connection was refused; the service may not be listening",
                    &[
                        "Verify the profile service is running",
                        "Check the configured API URL and port",
                    ],
                ),
                TransportPattern::new(
                    r"(?i)(no\s+such\s+host|host\s*not\s*found|name\s*resolution|dns\s*(error|failure|lookup))",
                    ErrorCategory::Network,
                    Severity::High,
                    true,
                    "Host lookup failed; the service address did not resolve",
                    &[
                        "Check the hostname in the configured API URL",
                        "Verify DNS resolution on this machine",
                    ],
                ),
                TransportPattern::new(
                    r"(?i)tim(ed?\s*out|eout)",
                    ErrorCategory::Network,
                    Severity::Medium,
                    true,
                    "The call timed out waiting for the service",
                    &[
                        "The service may be busy; retry after a short delay",
                        "Raise the request timeout if profile launches are slow on this machine",
                    ],
                ),
                TransportPattern::new(
                    r"(?i)(connection\s*reset|broken\s*pipe|connection\s*(aborted|closed))",
                    ErrorCategory::Network,
                    Severity::Medium,
                    true,
                    "The connection dropped mid-request",
                    &[
                        "Retry; resets are usually transient",
                        "Check whether the service restarted during the call",
                    ],
                ),
                TransportPattern::new(
                    r"(?i)(tls|ssl|certificate)",
                    ErrorCategory::Configuration,
                    Severity::High,
                    false,
                    "TLS negotiation failed",
                    &[
                        "Check whether the API URL should use http instead of https for a local service",
                        "Verify the service certificate if TLS is intended",
                    ],
                ),
                TransportPattern::new(
                    r"(?i)proxy",
                    ErrorCategory::Proxy,
                    Severity::High,
                    true,
                    "The fault points at the proxy layer",
                    &[
                        "Verify the proxy between this bridge and the service is reachable",
                        "Check proxy credentials and allowed destinations",
                    ],
                ),
            ],
        }
    }

    fn find(&self, message: &str) -> Option<&TransportPattern> {
        self.patterns.iter().find(|p| p.regex.is_match(message))
    }
}

fn matcher() -> &'static TransportMatcher {
    static MATCHER: OnceLock<TransportMatcher> = OnceLock::new();
    MATCHER.get_or_init(TransportMatcher::new)
}

/// Classifies a transport fault by message.
///
/// A message no pattern recognizes maps to `Unknown`, medium severity,
/// retryable: transport faults are optimistically treated as transient.
pub(crate) fn classify_transport(message: &str) -> ErrorClassification {
    match matcher().find(message) {
        Some(pattern) => ErrorClassification::new(
            pattern.category,
            pattern.severity,
            pattern.retryable,
            pattern.troubleshooting,
        ),
        None => ErrorClassification::new(
            ErrorCategory::Unknown,
            Severity::Medium,
            true,
            &[
                "The call failed before the service answered, for an unrecognized reason",
                "Retry once; inspect the raw fault text if it persists",
            ],
        ),
    }
}

/// Transport-specific lead for a message, if any pattern matches.
///
/// Used to enrich the troubleshooting of coded failures whose message also
/// reads like a transport fault.
pub(crate) fn transport_hint(message: &str) -> Option<String> {
    matcher().find(message).map(|p| p.hint.to_string())
}
