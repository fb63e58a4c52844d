//! Port for structured conversation logging.
//!
//! Defines the [`ConversationLogger`] trait for recording every agent
//! exchange and the decisions taken around it: pass boundaries,
//! completeness and validation verdicts, delegation outcomes and the life
//! of paused actions.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the full
//! transcript in a machine-readable format (JSONL).

use conductor_domain::{AgentRole, DelegationResult, Message, PendingAction};
use serde::Serialize;

/// Which check produced a [`ConversationEvent::Verdict`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictCheck {
    Completeness,
    Validation,
}

/// What happened to a paused action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingTransition {
    Paused,
    Confirmed,
    Cancelled,
}

/// A structured conversation event.
///
/// Serializes with a `type` tag (`agent_request`, `pass`, `verdict`, ...)
/// next to the variant's fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationEvent {
    AgentRequest {
        role: AgentRole,
        messages: Vec<Message>,
    },
    AgentReply {
        role: AgentRole,
        bytes: usize,
        text: String,
    },
    AgentError {
        role: AgentRole,
        error: String,
    },
    /// A code pass finished; `new_files` counts paths not written before.
    Pass {
        role: AgentRole,
        pass: u32,
        max_passes: u32,
        new_files: usize,
    },
    Verdict {
        check: VerdictCheck,
        pass: u32,
        passed: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    Delegation {
        round: u32,
        target: AgentRole,
        success: bool,
        files_written: Vec<String>,
        passes_used: u32,
        stagnation: bool,
    },
    Pending {
        conversation_id: String,
        transition: PendingTransition,
        reason: String,
        delegations: usize,
    },
}

impl ConversationEvent {
    pub fn agent_request(role: AgentRole, messages: &[Message]) -> Self {
        Self::AgentRequest {
            role,
            messages: messages.to_vec(),
        }
    }

    pub fn agent_reply(role: AgentRole, text: &str) -> Self {
        Self::AgentReply {
            role,
            bytes: text.len(),
            text: text.to_string(),
        }
    }

    pub fn agent_error(role: AgentRole, error: &str) -> Self {
        Self::AgentError {
            role,
            error: error.to_string(),
        }
    }

    pub fn delegation(round: u32, result: &DelegationResult) -> Self {
        Self::Delegation {
            round,
            target: result.target,
            success: result.success,
            files_written: result
                .written_paths()
                .into_iter()
                .map(str::to_string)
                .collect(),
            passes_used: result.passes_used,
            stagnation: result.stagnation,
        }
    }

    pub fn pending(action: &PendingAction, transition: PendingTransition) -> Self {
        Self::Pending {
            conversation_id: action.conversation_id.clone(),
            transition,
            reason: action.classification.reason.to_string(),
            delegations: action.delegations.len(),
        }
    }

    /// The `type` tag this event is written with
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AgentRequest { .. } => "agent_request",
            Self::AgentReply { .. } => "agent_reply",
            Self::AgentError { .. } => "agent_error",
            Self::Pass { .. } => "pass",
            Self::Verdict { .. } => "verdict",
            Self::Delegation { .. } => "delegation",
            Self::Pending { .. } => "pending",
        }
    }
}

/// Port for logging conversation events to a structured log.
///
/// `log` is synchronous and infallible; adapters swallow their own failures.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_events_serialize_with_type_tag() {
        let event = ConversationEvent::agent_reply(AgentRole::Coder, "# a.py");
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({ "type": "agent_reply", "role": "coder", "bytes": 6, "text": "# a.py" })
        );

        let event = ConversationEvent::Pending {
            conversation_id: "c1".to_string(),
            transition: PendingTransition::Paused,
            reason: "Ambiguous action, clarification needed".to_string(),
            delegations: 1,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], event.kind());
        assert_eq!(value["transition"], "paused");
    }

    #[test]
    fn test_verdict_without_detail_omits_the_field() {
        let event = ConversationEvent::Verdict {
            check: VerdictCheck::Completeness,
            pass: 2,
            passed: true,
            detail: None,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["check"], "completeness");
        assert!(value.get("detail").is_none());
    }
}
