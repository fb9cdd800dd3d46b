//! Markdown rendering of classifications, batch results, and analyses.
//!
//! Presentation only. Everything rendered here is derived from the
//! structured types; nothing feeds back into classification or execution.

use std::fmt::Write;

use crate::batch::{BatchAnalysis, BatchResult, WorkItem};
use crate::error::{troubleshooting_steps, ErrorClassification, ErrorSignal};

/// Renders one classified failure with its explanation and remediation
/// steps.
pub fn render_classification(
    classification: &ErrorClassification,
    signal: &ErrorSignal,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "**Error** ({}): {}", classification.category, signal);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", classification.explain());
    let steps = troubleshooting_steps(classification, signal);
    if !steps.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Troubleshooting:");
        for (index, step) in steps.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", index + 1, step);
        }
    }
    out
}

/// One-line summary of a batch outcome.
pub fn render_batch_summary<I: WorkItem, T>(verb: &str, result: &BatchResult<I, T>) -> String {
    let mut line = format!(
        "{} {} of {} profile(s); {} failed",
        verb,
        result.success_count(),
        result.total(),
        result.failure_count()
    );
    if result.cancelled {
        line.push_str(" (batch cancelled before completion)");
    }
    line
}

/// Renders a failure analysis: histograms, repeated patterns, and
/// recommendations.
pub fn render_analysis(analysis: &BatchAnalysis) -> String {
    let mut out = String::new();

    if !analysis.counts_by_category.is_empty() {
        let _ = writeln!(out, "**Failures by category**");
        let mut categories: Vec<_> = analysis.counts_by_category.iter().collect();
        categories.sort_by(|a, b| b.1.cmp(a.1).then(a.0.to_string().cmp(&b.0.to_string())));
        for (category, count) in categories {
            let _ = writeln!(out, "- {}: {}", category, count);
        }
        let _ = writeln!(out);
    }

    if !analysis.counts_by_severity.is_empty() {
        let _ = writeln!(out, "**Failures by severity**");
        let mut severities: Vec<_> = analysis.counts_by_severity.iter().collect();
        severities.sort_by(|a, b| b.0.cmp(a.0));
        for (severity, count) in severities {
            let _ = writeln!(out, "- {}: {}", severity, count);
        }
        let _ = writeln!(out);
    }

    if !analysis.common_patterns.is_empty() {
        let _ = writeln!(out, "**Repeated patterns**");
        for pattern in &analysis.common_patterns {
            let _ = writeln!(
                out,
                "- {} ({} occurrences; e.g. {})",
                pattern.signature,
                pattern.count,
                pattern.sample_messages.first().map(String::as_str).unwrap_or("-")
            );
        }
        let _ = writeln!(out);
    }

    if !analysis.recommendations.is_empty() {
        let _ = writeln!(out, "**Recommendations**");
        for recommendation in &analysis.recommendations {
            let _ = writeln!(out, "- {}", recommendation);
        }
    }

    let _ = write!(
        out,
        "\n{} retryable, {} critical",
        analysis.retryable_count, analysis.critical_count
    );
    out
}
