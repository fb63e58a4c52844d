//! Challenge messages returned to the user when an action is paused.

use super::classifier::Classification;
use crate::core::string::preview;
use crate::session::state::ProjectState;

/// Number of intent characters echoed back in a challenge.
pub const INTENT_PREVIEW_CHARS: usize = 100;

/// Build the clarifying message for a paused action.
///
/// Three templates exist: one for projects carrying technical debt, one for
/// structural or ambiguous intents, and a generic fallback.
pub fn generate_challenge(
    intent: &str,
    classification: &Classification,
    project_state: Option<ProjectState>,
) -> String {
    let reason = &classification.reason;
    let request = preview(intent, INTENT_PREVIEW_CHARS);

    if project_state == Some(ProjectState::Debt) {
        return format!(
            "⚠️ **VALIDATION REQUIRED**\n\n\
             **Reason**: {reason}\n\n\
             Your project carries technical debt. Before running this action I need to make sure it will not make things worse.\n\n\
             **Your request**: {request}\n\n\
             **Questions**:\n\
             1. Is this action critical for your current need?\n\
             2. Would you rather address the detected technical debt first?\n\
             3. Do you confirm the execution despite the debt?\n\n\
             Reply to continue."
        );
    }

    if reason.needs_clarification() {
        return format!(
            "⚠️ **CLARIFICATION NEEDED**\n\n\
             **Reason**: {reason}\n\n\
             **Your request**: {request}\n\n\
             **Questions**:\n\
             1. Which files or modules will be affected?\n\
             2. Are there dependencies to take into account?\n\
             3. Do you confirm this action?\n\n\
             Reply to continue."
        );
    }

    format!(
        "⚠️ **VALIDATION REQUIRED**\n\n\
         **Reason**: {reason}\n\n\
         **Your request**: {request}\n\n\
         Do you confirm this action?\n\n\
         Reply to continue."
    )
}
