//! Conversation message entities

use serde::{Deserialize, Serialize};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A message in a conversation (Entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// Content of the last user message in a history, or `""` when there is none.
pub fn latest_user_intent(history: &[Message]) -> &str {
    history
        .iter()
        .rev()
        .find(|m| m.is_user())
        .map(|m| m.content.as_str())
        .unwrap_or("")
}

/// All user messages joined by blank lines, or `None` for a history without any.
pub fn joined_user_prompts(history: &[Message]) -> Option<String> {
    let prompts: Vec<&str> = history
        .iter()
        .filter(|m| m.is_user())
        .map(|m| m.content.as_str())
        .collect();
    if prompts.is_empty() {
        None
    } else {
        Some(prompts.join("\n\n"))
    }
}
