//! Compact summary of a delegation round, sent back to the coordinator.
//!
//! ```text
//! ⚠️ CRITICAL ERRORS DETECTED:
//!   ⚠️ CODER produced NO file (parsing failed?)
//!
//! ❌ CODER: 0 file(s), 3 passes ⚠️ stagnation
//! ✅ REVIEWER: 0 file(s)
//!
//! 📋 Structure: 2 element(s)
//! ## src/app.py
//! - Classes: App(run())
//!
//! ---
//! Analyze the results. ...
//! ```

use crate::completeness::verdict::is_invalid;
use crate::core::string::preview;
use crate::delegation::entities::DelegationResult;

/// Written paths listed per delegation before collapsing into "(+K more)".
pub const MAX_LISTED_FILES: usize = 5;
/// Characters of a failed agent's reply quoted in the error block.
pub const ERROR_EXCERPT_CHARS: usize = 100;
/// Characters kept per compacted report line.
pub const REPORT_LINE_CHARS: usize = 100;
/// Compacted report lines kept.
pub const REPORT_MAX_LINES: usize = 10;
/// Total characters of the compacted report.
pub const REPORT_MAX_CHARS: usize = 500;

const REPORT_LINE_PREFIXES: &[&str] = &["## ", "- Classes:", "- Functions:"];

const CLOSING_INSTRUCTION: &str = "\n---\nAnalyze the results. If the work is complete, answer the user. \
If it is incomplete or something failed, say what is missing or what failed.";

fn summary_line(result: &DelegationResult) -> String {
    let status = if result.success { "✅" } else { "❌" };
    let mut line = format!(
        "{} {}: {} file(s)",
        status,
        result.target.label(),
        result.written_count()
    );
    if result.passes_used > 1 {
        line.push_str(&format!(", {} passes", result.passes_used));
    }
    if result.stagnation {
        line.push_str(" ⚠️ stagnation");
    }
    line
}

fn file_list_line(result: &DelegationResult) -> Option<String> {
    let written = result.written_paths();
    if written.is_empty() {
        return None;
    }
    let mut list = written
        .iter()
        .take(MAX_LISTED_FILES)
        .copied()
        .collect::<Vec<_>>()
        .join(", ");
    if written.len() > MAX_LISTED_FILES {
        list.push_str(&format!(" (+{} more)", written.len() - MAX_LISTED_FILES));
    }
    Some(format!("  Files: {}", list))
}

fn critical_errors(results: &[DelegationResult]) -> Vec<String> {
    let mut errors = Vec::new();
    for result in results {
        if !result.success {
            errors.push(format!(
                "❌ {} failed: {}",
                result.target.label(),
                preview(&result.result_text, ERROR_EXCERPT_CHARS)
            ));
        } else if result.target.is_coder() && result.written_count() == 0 {
            errors.push(format!(
                "⚠️ {} produced NO file (parsing failed?)",
                result.target.label()
            ));
        }
        if result.validation_report.as_deref().is_some_and(is_invalid) {
            errors.push("⚠️ VALIDATOR found problems in the code".to_string());
        }
    }
    errors
}

/// Keep only headings, classes and functions of a structure report.
///
/// Returns the number of matching lines and the compacted text.
pub fn compact_report(report: &str) -> (usize, String) {
    let matching: Vec<&str> = report
        .lines()
        .filter(|line| REPORT_LINE_PREFIXES.iter().any(|p| line.starts_with(p)))
        .collect();

    let text = matching
        .iter()
        .take(REPORT_MAX_LINES)
        .map(|line| preview(line, REPORT_LINE_CHARS))
        .collect::<Vec<_>>()
        .join("\n");

    let text = if text.chars().count() > REPORT_MAX_CHARS {
        format!("{}...", preview(&text, REPORT_MAX_CHARS))
    } else {
        text
    };

    (matching.len(), text)
}

/// Build the judgment request for one round of delegations.
pub fn build_follow_up(results: &[DelegationResult], code_report: Option<&str>) -> String {
    let mut parts = Vec::new();

    let errors = critical_errors(results);
    if !errors.is_empty() {
        parts.push("⚠️ CRITICAL ERRORS DETECTED:".to_string());
        parts.extend(errors.into_iter().map(|e| format!("  {}", e)));
        parts.push(String::new());
    }

    for result in results {
        parts.push(summary_line(result));
        if let Some(files) = file_list_line(result) {
            parts.push(files);
        }
    }

    if let Some(report) = code_report.filter(|r| !r.trim().is_empty()) {
        let (count, text) = compact_report(report);
        parts.push(format!("\n📋 Structure: {} element(s)", count));
        parts.push(text);
    }

    parts.push(CLOSING_INSTRUCTION.to_string());
    parts.join("\n")
}
