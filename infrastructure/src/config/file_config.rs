//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain/application types where
//! appropriate.

use conductor_application::OrchestrationPolicy;
use conductor_domain::{ConfigIssue, ConfigIssueCode, OutputFormat, SafetyRules};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// Re-export OutputFormat from domain for convenience
pub use conductor_domain::OutputFormat as FileOutputFormat;

/// Raw safety configuration from TOML
///
/// Entries extend the built-in keyword lists; they never replace them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSafetyConfig {
    /// Additional keywords that make an intent NON-SAFE
    pub extra_non_safe_keywords: Vec<String>,
    /// Additional phrases that make an intent SAFE
    pub extra_safe_phrases: Vec<String>,
}

impl FileSafetyConfig {
    pub fn to_rules(&self) -> SafetyRules {
        SafetyRules::default()
            .with_extra_non_safe_keywords(&self.extra_non_safe_keywords)
            .with_extra_safe_phrases(&self.extra_safe_phrases)
    }
}

/// Raw storage configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// Directory holding paused actions (one JSON file per conversation).
    /// Defaults to the platform data directory.
    pub pending_dir: Option<PathBuf>,
}

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL transcript of every agent exchange
    pub conversation_log: Option<PathBuf>,
}

/// Raw output configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Output format (uses domain type)
    pub format: Option<OutputFormat>,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
        }
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Delegation loop limits
    pub orchestration: OrchestrationPolicy,
    /// Safety classifier additions
    pub safety: FileSafetyConfig,
    /// Pending action storage
    pub storage: FileStorageConfig,
    /// Conversation transcript
    pub logging: FileLoggingConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the configuration
    ///
    /// Returns every issue found; callers decide whether warnings matter.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.orchestration.validate();

        let blank = self
            .safety
            .extra_non_safe_keywords
            .iter()
            .chain(&self.safety.extra_safe_phrases)
            .any(|entry| entry.trim().is_empty());
        if blank {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::EmptySafetyEntry,
                "safety: empty keyword or phrase entries are ignored",
            ));
        }

        issues
    }

    /// Whether any issue is an error
    pub fn has_errors(issues: &[ConfigIssue]) -> bool {
        issues.iter().any(|i| i.is_error())
    }
}
