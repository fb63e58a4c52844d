//! Orchestration policy: delegation loop control.
//!
//! [`OrchestrationPolicy`] groups the constants that bound a delegation:
//! how many passes a code delegation may take, when an unproductive loop is
//! abandoned, and how many times the coordinator may relaunch work.
//!
//! # Pass budget
//!
//! ```text
//! estimate   = max(ceil(files × tokens_per_file / specialist_output_tokens), 1)
//! max_passes = min(estimate × pass_multiplier, max_passes)
//! ```
//!
//! With the defaults, anything up to five files gets 10 passes and six or
//! more get the ceiling of 20.

use conductor_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestrationPolicy {
    /// Estimated output tokens per requested file.
    pub tokens_per_file: u32,
    /// Output budget of one specialist reply.
    pub specialist_output_tokens: u32,
    /// Passes granted per estimated reply.
    pub pass_multiplier: u32,
    /// Absolute pass ceiling per delegation.
    pub max_passes: u32,
    /// Empty passes tolerated before stopping (stops on the next one).
    pub stagnation_tolerance: u32,
    /// Further rounds the coordinator may request after judging results.
    pub max_relances: u32,
    /// Lines per file sent to reviewers and validators.
    pub review_max_lines: usize,
}

impl Default for OrchestrationPolicy {
    fn default() -> Self {
        Self {
            tokens_per_file: 800,
            specialist_output_tokens: 4096,
            pass_multiplier: 10,
            max_passes: 20,
            stagnation_tolerance: 1,
            max_relances: 2,
            review_max_lines: 200,
        }
    }
}

impl OrchestrationPolicy {
    // ==================== Builder Methods ====================

    pub fn with_tokens_per_file(mut self, tokens: u32) -> Self {
        self.tokens_per_file = tokens;
        self
    }

    pub fn with_specialist_output_tokens(mut self, tokens: u32) -> Self {
        self.specialist_output_tokens = tokens;
        self
    }

    pub fn with_pass_multiplier(mut self, multiplier: u32) -> Self {
        self.pass_multiplier = multiplier;
        self
    }

    pub fn with_max_passes(mut self, max: u32) -> Self {
        self.max_passes = max;
        self
    }

    pub fn with_stagnation_tolerance(mut self, tolerance: u32) -> Self {
        self.stagnation_tolerance = tolerance;
        self
    }

    pub fn with_max_relances(mut self, max: u32) -> Self {
        self.max_relances = max;
        self
    }

    pub fn with_review_max_lines(mut self, lines: usize) -> Self {
        self.review_max_lines = lines;
        self
    }

    // ==================== Budget ====================

    /// Estimated specialist replies needed for `file_count` files (at least 1).
    pub fn estimated_replies(&self, file_count: usize) -> u32 {
        let files = file_count.max(1) as u64;
        let budget = u64::from(self.specialist_output_tokens.max(1));
        let tokens = files * u64::from(self.tokens_per_file);
        let replies = tokens.div_ceil(budget).max(1);
        u32::try_from(replies).unwrap_or(u32::MAX)
    }

    /// Pass ceiling for a delegation expected to produce `file_count` files.
    pub fn max_passes_for(&self, file_count: usize) -> u32 {
        self.estimated_replies(file_count)
            .saturating_mul(self.pass_multiplier)
            .min(self.max_passes)
    }

    /// Total delegation rounds: the initial one plus relances.
    pub fn max_rounds(&self) -> u32 {
        self.max_relances.saturating_add(1)
    }

    // ==================== Validation ====================

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.max_passes == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroMaxPasses,
                "orchestration.max_passes must be at least 1",
            ));
        }
        if self.pass_multiplier == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroPassMultiplier,
                "orchestration.pass_multiplier must be at least 1",
            ));
        }
        if self.specialist_output_tokens == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroOutputBudget,
                "orchestration.specialist_output_tokens must be at least 1",
            ));
        }
        if self.review_max_lines == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::ZeroReviewLines,
                "orchestration.review_max_lines is 0; reviewers will see empty files",
            ));
        }
        if self.max_passes > 0 && self.stagnation_tolerance + 1 >= self.max_passes {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::StagnationToleranceTooHigh,
                format!(
                    "orchestration.stagnation_tolerance ({}) never triggers before max_passes ({})",
                    self.stagnation_tolerance, self.max_passes
                ),
            ));
        }

        issues
    }
}
