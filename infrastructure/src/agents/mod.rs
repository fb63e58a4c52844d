//! Agent gateway adapters.

mod scripted;

pub use scripted::{ScriptError, ScriptedAgentGateway};
