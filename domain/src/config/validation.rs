//! Structured configuration issues.
//!
//! Validators in the application and infrastructure layers report problems
//! as [`ConfigIssue`]s. An [`Severity::Error`] issue means the configuration
//! cannot be used; a [`Severity::Warning`] is reported and ignored.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// `max_passes` is zero: no delegation could ever run.
    ZeroMaxPasses,
    /// `pass_multiplier` is zero.
    ZeroPassMultiplier,
    /// `specialist_output_tokens` is zero: the pass estimate divides by it.
    ZeroOutputBudget,
    /// Stagnation can never trigger before the pass ceiling.
    StagnationToleranceTooHigh,
    /// `review_max_lines` is zero: reviewers would see empty files.
    ZeroReviewLines,
    /// A blank keyword or phrase in the safety lists.
    EmptySafetyEntry,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", level, self.message)
    }
}
