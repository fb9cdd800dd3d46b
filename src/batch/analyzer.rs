//! Aggregate analysis over a batch's failures.
//!
//! Classification is pure, so the analyzer re-derives every failure's
//! classification from its stored signal instead of trusting any cached
//! copy. The analysis is a read-only view: it can be computed zero or many
//! times over the same failures without touching them.

use std::collections::HashMap;

use serde::Serialize;

use crate::batch::outcome::{BatchFailure, WorkItem};
use crate::error::{classify, code_name, ErrorCategory, ErrorSignal, Severity};

/// Substring probes run over every failure message, case-insensitively.
const KEYWORD_PROBES: &[&str] = &[
    "timeout",
    "connection",
    "authentication",
    "not found",
    "conflict",
];

/// Minimum occurrences before a pattern is worth reporting.
const PATTERN_THRESHOLD: usize = 2;

/// Samples kept per reported pattern.
const PATTERN_SAMPLES: usize = 3;

/// A repeated failure signature across a batch.
#[derive(Clone, Debug, Serialize)]
pub struct FailurePattern {
    /// What repeated: a keyword probe or a labeled result code.
    pub signature: String,
    /// How many failures matched.
    pub count: usize,
    /// Up to three ids of affected items.
    pub sample_items: Vec<String>,
    /// Up to three of the matching messages.
    pub sample_messages: Vec<String>,
}

/// Aggregate statistics and guidance derived from a batch's failures.
#[derive(Clone, Debug, Default, Serialize)]
pub struct BatchAnalysis {
    pub counts_by_category: HashMap<ErrorCategory, usize>,
    pub counts_by_severity: HashMap<Severity, usize>,
    /// Repeated signatures, sorted by descending count.
    pub common_patterns: Vec<FailurePattern>,
    pub recommendations: Vec<String>,
    pub retryable_count: usize,
    pub critical_count: usize,
}

impl BatchAnalysis {
    pub fn count_for_category(&self, category: ErrorCategory) -> usize {
        self.counts_by_category.get(&category).copied().unwrap_or(0)
    }

    pub fn count_for_severity(&self, severity: Severity) -> usize {
        self.counts_by_severity.get(&severity).copied().unwrap_or(0)
    }
}

/// Analyzes a batch's failures.
pub fn analyze<I: WorkItem>(failures: &[BatchFailure<I>]) -> BatchAnalysis {
    let mut analysis = BatchAnalysis::default();
    if failures.is_empty() {
        return analysis;
    }

    let total = failures.len();
    for failure in failures {
        let classification = classify(&failure.error.signal);
        *analysis
            .counts_by_category
            .entry(classification.category)
            .or_insert(0) += 1;
        *analysis
            .counts_by_severity
            .entry(classification.severity)
            .or_insert(0) += 1;
        if classification.retryable {
            analysis.retryable_count += 1;
        }
        if classification.is_critical() {
            analysis.critical_count += 1;
        }
    }

    analysis.common_patterns = collect_patterns(failures);
    analysis.recommendations = recommendations(&analysis, total);
    analysis
}

fn collect_patterns<I: WorkItem>(failures: &[BatchFailure<I>]) -> Vec<FailurePattern> {
    let mut patterns = Vec::new();

    // Message-level probes.
    for probe in KEYWORD_PROBES {
        let matching: Vec<&BatchFailure<I>> = failures
            .iter()
            .filter(|f| {
                f.error
                    .signal
                    .message()
                    .to_lowercase()
                    .contains(&probe.to_lowercase())
            })
            .collect();
        if matching.len() >= PATTERN_THRESHOLD {
            patterns.push(pattern_from(probe.to_string(), &matching));
        }
    }

    // Code-level grouping.
    let mut by_code: HashMap<i64, Vec<&BatchFailure<I>>> = HashMap::new();
    for failure in failures {
        if let ErrorSignal::Coded { code, .. } = &failure.error.signal {
            by_code.entry(*code).or_default().push(failure);
        }
    }
    let mut codes: Vec<_> = by_code.into_iter().collect();
    codes.sort_by_key(|(code, _)| *code);
    for (code, matching) in codes {
        if matching.len() >= PATTERN_THRESHOLD {
            let signature = match code_name(code) {
                Some(name) => format!("code {} ({})", code, name),
                None => format!("code {}", code),
            };
            patterns.push(pattern_from(signature, &matching));
        }
    }

    patterns.sort_by(|a, b| b.count.cmp(&a.count).then(a.signature.cmp(&b.signature)));
    patterns
}

fn pattern_from<I: WorkItem>(signature: String, matching: &[&BatchFailure<I>]) -> FailurePattern {
    FailurePattern {
        signature,
        count: matching.len(),
        sample_items: matching
            .iter()
            .take(PATTERN_SAMPLES)
            .map(|f| f.item.id().to_string())
            .collect(),
        sample_messages: matching
            .iter()
            .take(PATTERN_SAMPLES)
            .map(|f| f.error.signal.message().to_string())
            .collect(),
    }
}

fn recommendations(analysis: &BatchAnalysis, total: usize) -> Vec<String> {
    let mut out = Vec::new();

    if analysis.critical_count > 0 {
        out.push(format!(
            "{} critical failure(s) need attention before resubmitting anything",
            analysis.critical_count
        ));
    }
    if analysis.count_for_category(ErrorCategory::Authentication) > 0 {
        out.push(
            "Authentication failures present: verify the API key and its permissions".to_string(),
        );
    }
    if analysis.count_for_category(ErrorCategory::Network) > 0 {
        out.push(
            "Network failures present: check connectivity to the profile service".to_string(),
        );
    }
    if total > 0 && analysis.retryable_count * 10 > total * 7 {
        out.push(format!(
            "{} of {} failures are retryable: resubmitting the failed items will likely recover most of them",
            analysis.retryable_count, total
        ));
    }
    if analysis.count_for_category(ErrorCategory::BrowserLifecycle) > 0 {
        out.push(
            "Browser launch failures present: check kernel downloads and free memory on the service host"
                .to_string(),
        );
    }
    if analysis.count_for_category(ErrorCategory::Configuration) > 0 {
        out.push(
            "Configuration failures present: fix the request parameters before retrying"
                .to_string(),
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::OperationError;

    fn failure(id: &str, signal: ErrorSignal) -> BatchFailure<String> {
        BatchFailure {
            item: id.to_string(),
            error: OperationError {
                classification: classify(&signal),
                signal,
                attempts: 1,
            },
        }
    }

    #[test]
    fn test_empty_failures_yield_empty_analysis() {
        let analysis = analyze::<String>(&[]);
        assert!(analysis.counts_by_category.is_empty());
        assert!(analysis.common_patterns.is_empty());
        assert!(analysis.recommendations.is_empty());
    }

    #[test]
    fn test_histograms() {
        let failures = vec![
            failure("a", ErrorSignal::coded(401, "unauthorized")),
            failure("b", ErrorSignal::coded(500, "server error")),
            failure("c", ErrorSignal::transport("connection refused")),
            failure("d", ErrorSignal::transport("connection reset by peer")),
        ];
        let analysis = analyze(&failures);

        assert_eq!(analysis.count_for_category(ErrorCategory::Authentication), 1);
        assert_eq!(analysis.count_for_category(ErrorCategory::Server), 1);
        assert_eq!(analysis.count_for_category(ErrorCategory::Network), 2);
        assert_eq!(analysis.count_for_severity(Severity::Critical), 1);
        assert_eq!(analysis.critical_count, 1);
        assert_eq!(analysis.retryable_count, 3);
    }

    #[test]
    fn test_keyword_and_code_patterns_sorted_by_count() {
        // Three coded 404s and four timeout messages.
        let failures = vec![
            failure("a", ErrorSignal::coded(404, "profile not found")),
            failure("b", ErrorSignal::coded(404, "profile not found")),
            failure("c", ErrorSignal::coded(404, "profile not found")),
            failure("d", ErrorSignal::transport("operation timeout")),
            failure("e", ErrorSignal::transport("request timeout")),
            failure("f", ErrorSignal::transport("timeout waiting for service")),
            failure("g", ErrorSignal::coded(408, "upstream timeout")),
            failure("h", ErrorSignal::coded(401, "unauthorized")),
            failure("i", ErrorSignal::transport("weird failure")),
            failure("j", ErrorSignal::coded(500, "server error")),
        ];
        let analysis = analyze(&failures);

        let timeout = analysis
            .common_patterns
            .iter()
            .find(|p| p.signature == "timeout")
            .expect("timeout pattern reported");
        assert_eq!(timeout.count, 4);
        assert_eq!(timeout.sample_messages.len(), 3);

        let not_found = analysis
            .common_patterns
            .iter()
            .find(|p| p.signature == "code 404 (Not Found)")
            .expect("404 pattern reported");
        assert_eq!(not_found.count, 3);
        assert_eq!(not_found.sample_items, vec!["a", "b", "c"]);

        let timeout_pos = analysis
            .common_patterns
            .iter()
            .position(|p| p.signature == "timeout")
            .unwrap();
        let not_found_pos = analysis
            .common_patterns
            .iter()
            .position(|p| p.signature == "code 404 (Not Found)")
            .unwrap();
        assert!(timeout_pos < not_found_pos, "higher count sorts first");
    }

    #[test]
    fn test_single_occurrence_is_not_a_pattern() {
        let failures = vec![
            failure("a", ErrorSignal::coded(404, "profile not found")),
            failure("b", ErrorSignal::coded(500, "server error")),
        ];
        let analysis = analyze(&failures);
        assert!(analysis
            .common_patterns
            .iter()
            .all(|p| p.signature != "code 404 (Not Found)" && p.signature != "code 500 (Internal Server Error)"));
    }

    #[test]
    fn test_keyword_probe_is_case_insensitive() {
        let failures = vec![
            failure("a", ErrorSignal::transport("Connection Refused")),
            failure("b", ErrorSignal::transport("CONNECTION reset")),
        ];
        let analysis = analyze(&failures);
        let connection = analysis
            .common_patterns
            .iter()
            .find(|p| p.signature == "connection")
            .expect("connection pattern reported");
        assert_eq!(connection.count, 2);
    }

    #[test]
    fn test_recommendations_rules() {
        let failures = vec![
            failure("a", ErrorSignal::coded(401, "unauthorized")),
            failure("b", ErrorSignal::transport("connection refused")),
            failure("c", ErrorSignal::coded(10001, "browser launch failed")),
            failure("d", ErrorSignal::coded(400, "bad group id")),
        ];
        let analysis = analyze(&failures);
        let joined = analysis.recommendations.join("\n");

        assert!(joined.contains("critical"));
        assert!(joined.contains("API key"));
        assert!(joined.contains("connectivity"));
        assert!(joined.contains("Browser launch"));
        assert!(joined.contains("Configuration"));
    }

    #[test]
    fn test_retryable_fraction_recommendation() {
        // All four failures retryable: fraction well above the bar.
        let failures = vec![
            failure("a", ErrorSignal::transport("connection refused")),
            failure("b", ErrorSignal::transport("connection refused")),
            failure("c", ErrorSignal::coded(503, "unavailable")),
            failure("d", ErrorSignal::coded(503, "unavailable")),
        ];
        let analysis = analyze(&failures);
        assert!(analysis
            .recommendations
            .iter()
            .any(|r| r.contains("resubmitting")));

        // One of four retryable: no such recommendation.
        let failures = vec![
            failure("a", ErrorSignal::coded(401, "denied")),
            failure("b", ErrorSignal::coded(404, "missing")),
            failure("c", ErrorSignal::coded(400, "bad request")),
            failure("d", ErrorSignal::coded(503, "unavailable")),
        ];
        let analysis = analyze(&failures);
        assert!(!analysis
            .recommendations
            .iter()
            .any(|r| r.contains("resubmitting")));
    }

    #[test]
    fn test_analysis_is_read_only_and_repeatable() {
        let failures = vec![
            failure("a", ErrorSignal::coded(404, "profile not found")),
            failure("b", ErrorSignal::coded(404, "profile not found")),
        ];
        let first = analyze(&failures);
        let second = analyze(&failures);
        assert_eq!(first.counts_by_category, second.counts_by_category);
        assert_eq!(first.common_patterns.len(), second.common_patterns.len());
    }
}
