//! The fixed result-code table.
//!
//! The profile service reports failures through numeric result codes that
//! largely mirror HTTP status semantics, plus a handful of vendor codes for
//! browser and proxy conditions. Each entry statically fixes category,
//! severity, retryability, and a troubleshooting list. The table is compiled
//! in and never mutated.
//!
//! Code-based classification is a default that message inspection may
//! override: a 409 whose message reports exhausted quota is downgraded to
//! non-retryable, because that is a capacity problem rather than a transient
//! conflict.

use regex::Regex;
use std::sync::OnceLock;

use super::classification::{ErrorCategory, ErrorClassification, Severity};

/// One row of the code table.
struct CodeEntry {
    code: i64,
    name: &'static str,
    category: ErrorCategory,
    severity: Severity,
    retryable: bool,
    troubleshooting: &'static [&'static str],
}

/// Result code reported by the service on success. Never classified as a
/// failure by the executor; kept in the table so lookups stay total.
pub const SUCCESS_CODE: i64 = 0;

const CODE_TABLE: &[CodeEntry] = &[
    CodeEntry {
        code: 0,
        name: "Success",
        category: ErrorCategory::Unknown,
        severity: Severity::Low,
        retryable: false,
        troubleshooting: &[
            "Result code 0 indicates success; this response should not have been reported as a failure",
            "Check the calling code for a mismatched success check",
        ],
    },
    CodeEntry {
        code: 400,
        name: "Bad Request",
        category: ErrorCategory::Configuration,
        severity: Severity::High,
        retryable: false,
        troubleshooting: &[
            "Check the request parameters against the profile service API documentation",
            "Verify required fields (profile id, group id) are present and well formed",
        ],
    },
    CodeEntry {
        code: 401,
        name: "Unauthorized",
        category: ErrorCategory::Authentication,
        severity: Severity::Critical,
        retryable: false,
        troubleshooting: &[
            "Verify the API key is set and has not expired",
            "Confirm the local service is running with API access enabled",
            "Regenerate the key in the profile manager settings if necessary",
        ],
    },
    CodeEntry {
        code: 403,
        name: "Forbidden",
        category: ErrorCategory::Authentication,
        severity: Severity::Critical,
        retryable: false,
        troubleshooting: &[
            "The credentials are valid but lack permission for this operation",
            "Check the account plan and the permissions granted to the API key",
        ],
    },
    CodeEntry {
        code: 404,
        name: "Not Found",
        category: ErrorCategory::Resource,
        severity: Severity::High,
        retryable: false,
        troubleshooting: &[
            "Verify the profile id exists in the profile manager",
            "The profile may have been deleted by another client; refresh the profile list",
        ],
    },
    CodeEntry {
        code: 408,
        name: "Request Timeout",
        category: ErrorCategory::Network,
        severity: Severity::Medium,
        retryable: true,
        troubleshooting: &[
            "The service accepted the connection but did not answer in time",
            "Check local service load; opening many profiles at once slows responses",
        ],
    },
    CodeEntry {
        code: 409,
        name: "Conflict",
        category: ErrorCategory::Resource,
        severity: Severity::Medium,
        retryable: true,
        troubleshooting: &[
            "The profile is busy (already opening or closing); retry after a short delay",
            "Close the profile from the profile manager UI if it is stuck",
        ],
    },
    CodeEntry {
        code: 500,
        name: "Internal Server Error",
        category: ErrorCategory::Server,
        severity: Severity::High,
        retryable: true,
        troubleshooting: &[
            "The profile service hit an internal error; it usually recovers on its own",
            "Restart the local profile manager if the error persists",
        ],
    },
    CodeEntry {
        code: 502,
        name: "Bad Gateway",
        category: ErrorCategory::Proxy,
        severity: Severity::High,
        retryable: true,
        troubleshooting: &[
            "An upstream gateway or proxy rejected the request",
            "Verify the proxy configured for the profile is reachable and accepts connections",
        ],
    },
    CodeEntry {
        code: 503,
        name: "Service Unavailable",
        category: ErrorCategory::Server,
        severity: Severity::High,
        retryable: true,
        troubleshooting: &[
            "The profile service is temporarily overloaded or restarting",
            "Reduce the batch window size to lower concurrent load",
        ],
    },
    CodeEntry {
        code: 504,
        name: "Gateway Timeout",
        category: ErrorCategory::Server,
        severity: Severity::Medium,
        retryable: true,
        troubleshooting: &[
            "An upstream dependency of the service did not answer in time",
            "Retry; if it keeps happening check the service's own connectivity",
        ],
    },
    CodeEntry {
        code: -1,
        name: "Service Error",
        category: ErrorCategory::Server,
        severity: Severity::High,
        retryable: true,
        troubleshooting: &[
            "The service reported a generic failure without a specific code",
            "Check the service logs for the underlying cause",
        ],
    },
    CodeEntry {
        code: 10001,
        name: "Browser Launch Failed",
        category: ErrorCategory::BrowserLifecycle,
        severity: Severity::Medium,
        retryable: true,
        troubleshooting: &[
            "The browser kernel for this profile failed to start",
            "Verify the configured kernel version is downloaded and not corrupted",
            "Check free memory; each open profile runs a full browser instance",
        ],
    },
    CodeEntry {
        code: 10003,
        name: "Proxy Check Failed",
        category: ErrorCategory::Proxy,
        severity: Severity::High,
        retryable: true,
        troubleshooting: &[
            "The profile's proxy did not pass the pre-launch connectivity check",
            "Verify proxy host, port, and credentials in the profile settings",
        ],
    },
];

fn lookup(code: i64) -> Option<&'static CodeEntry> {
    CODE_TABLE.iter().find(|entry| entry.code == code)
}

/// Human name for a known code, used when labeling aggregated patterns.
pub fn code_name(code: i64) -> Option<&'static str> {
    lookup(code).map(|entry| entry.name)
}

/// Message patterns that mark a 409 as exhausted capacity rather than a
/// transient conflict. The first alternative is the literal phrase the
/// service emits in its own locale; kept narrow on purpose.
fn quota_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"额度不足|(?i)quota\s*(exceeded|exhausted|insufficient)|(?i)insufficient\s*(quota|balance)")
            .expect("quota pattern is valid")
    })
}

/// Classifies a coded failure. Unrecognized codes map to `Unknown`,
/// medium severity, non-retryable.
pub(crate) fn classify_code(code: i64, message: &str) -> ErrorClassification {
    if code == 409 && quota_pattern().is_match(message) {
        return ErrorClassification::new(
            ErrorCategory::Resource,
            Severity::High,
            false,
            &[
                "The account's profile quota is exhausted; retrying cannot help",
                "Delete unused profiles or upgrade the plan to free capacity",
            ],
        );
    }

    match lookup(code) {
        Some(entry) => ErrorClassification::new(
            entry.category,
            entry.severity,
            entry.retryable,
            entry.troubleshooting,
        ),
        None => ErrorClassification::new(
            ErrorCategory::Unknown,
            Severity::Medium,
            false,
            &[
                "The service returned a result code this bridge does not recognize",
                "Check the service changelog; a new code may need a table entry",
            ],
        ),
    }
}
