//! Delegation entities

use crate::files::outcome::FileWriteOutcome;
use serde::{Deserialize, Serialize};

/// Agents taking part in an orchestration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    /// Plans, emits directives and judges results.
    Coordinator,
    /// Code specialist; the only role whose output is written to disk.
    Coder,
    /// Generalist worker; also verifies completeness and reports structure.
    Reviewer,
    /// Strict quality checker.
    Validator,
}

impl AgentRole {
    pub const ALL: [AgentRole; 4] = [
        AgentRole::Coordinator,
        AgentRole::Coder,
        AgentRole::Reviewer,
        AgentRole::Validator,
    ];

    /// Role addressed by a directive name.
    pub fn from_marker(name: &str) -> Option<Self> {
        match name {
            "CODE_REQUEST" => Some(AgentRole::Coder),
            "BASE_VALIDATION_REQUEST" => Some(AgentRole::Reviewer),
            "STRICT_VALIDATION_REQUEST" => Some(AgentRole::Validator),
            _ => None,
        }
    }

    /// Directive name addressing this role, if it can be delegated to.
    pub fn marker(&self) -> Option<&'static str> {
        match self {
            AgentRole::Coordinator => None,
            AgentRole::Coder => Some("CODE_REQUEST"),
            AgentRole::Reviewer => Some("BASE_VALIDATION_REQUEST"),
            AgentRole::Validator => Some("STRICT_VALIDATION_REQUEST"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Coordinator => "coordinator",
            AgentRole::Coder => "coder",
            AgentRole::Reviewer => "reviewer",
            AgentRole::Validator => "validator",
        }
    }

    /// Uppercase label used in summaries sent back to the coordinator.
    pub fn label(&self) -> &'static str {
        match self {
            AgentRole::Coordinator => "COORDINATOR",
            AgentRole::Coder => "CODER",
            AgentRole::Reviewer => "REVIEWER",
            AgentRole::Validator => "VALIDATOR",
        }
    }

    pub fn is_coder(&self) -> bool {
        *self == AgentRole::Coder
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for AgentRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "coordinator" => Ok(AgentRole::Coordinator),
            "coder" => Ok(AgentRole::Coder),
            "reviewer" => Ok(AgentRole::Reviewer),
            "validator" => Ok(AgentRole::Validator),
            other => Err(format!("unknown agent role '{}'", other)),
        }
    }
}

/// One directive found in a coordinator reply (immutable).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    pub target: AgentRole,
    pub instruction: String,
    /// The directive exactly as it appeared, brackets included.
    pub raw_marker: String,
}

/// Outcome of running one delegation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationResult {
    pub target: AgentRole,
    pub instruction: String,
    pub result_text: String,
    pub success: bool,
    pub files_written: Vec<FileWriteOutcome>,
    pub passes_used: u32,
    pub stagnation: bool,
    pub validation_report: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DelegationResult {
    /// A successful result with no files yet; the executor fills in the rest.
    pub fn succeeded(delegation: &Delegation, result_text: impl Into<String>) -> Self {
        Self {
            target: delegation.target,
            instruction: delegation.instruction.clone(),
            result_text: result_text.into(),
            success: true,
            files_written: Vec::new(),
            passes_used: 1,
            stagnation: false,
            validation_report: None,
            error: None,
        }
    }

    /// The specialist could not be reached or failed to answer.
    pub fn failed(delegation: &Delegation, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            target: delegation.target,
            instruction: delegation.instruction.clone(),
            result_text: format!(
                "[Error: {} could not respond: {}]",
                delegation.target.label(),
                error
            ),
            success: false,
            files_written: Vec::new(),
            passes_used: 0,
            stagnation: false,
            validation_report: None,
            error: Some(error),
        }
    }

    /// Outcomes that actually reached the disk.
    pub fn written(&self) -> impl Iterator<Item = &FileWriteOutcome> {
        self.files_written.iter().filter(|f| f.is_written())
    }

    pub fn written_count(&self) -> usize {
        self.written().count()
    }

    pub fn written_paths(&self) -> Vec<&str> {
        self.written().map(|f| f.path.as_str()).collect()
    }
}
