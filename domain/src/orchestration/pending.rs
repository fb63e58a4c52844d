//! Paused actions awaiting user confirmation.

use crate::delegation::entities::Delegation;
use crate::safety::classifier::Classification;
use crate::session::entities::Message;
use crate::session::state::SessionState;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything needed to re-run an orchestration later.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResumableContext {
    pub history: Vec<Message>,
    #[serde(default)]
    pub project_root: Option<PathBuf>,
    #[serde(default)]
    pub session: Option<SessionState>,
}

/// A NON-SAFE action paused by the safety gate.
///
/// At most one exists per conversation. It is consumed when confirmed and
/// removed when cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAction {
    pub conversation_id: String,
    pub user_intent: String,
    /// The coordinator reply that carried the directives.
    pub original_response: String,
    pub delegations: Vec<Delegation>,
    pub classification: Classification,
    pub context: ResumableContext,
    #[serde(default)]
    pub confirmed: bool,
}

impl PendingAction {
    pub fn new(
        conversation_id: impl Into<String>,
        user_intent: impl Into<String>,
        original_response: impl Into<String>,
        delegations: Vec<Delegation>,
        classification: Classification,
        context: ResumableContext,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            user_intent: user_intent.into(),
            original_response: original_response.into(),
            delegations,
            classification,
            context,
            confirmed: false,
        }
    }

    pub fn confirm(&mut self) {
        self.confirmed = true;
    }
}
