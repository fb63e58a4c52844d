//! Conversation session domain.
//!
//! - [`entities::Message`]: a single message within a conversation
//! - [`state::SessionState`]: the write-authority state machine

pub mod entities;
pub mod state;
