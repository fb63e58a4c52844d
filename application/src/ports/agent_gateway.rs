//! Agent gateway port
//!
//! Defines the interface for reaching the agents of an orchestration.
//! Provider adapters (remote LLM APIs, scripted replays) live in the
//! infrastructure layer.

use async_trait::async_trait;
use conductor_domain::{AgentRole, Message};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while talking to an agent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Agent not configured: {0}")]
    UnknownAgent(AgentRole),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("No scripted reply left for {0}")]
    ScriptExhausted(AgentRole),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// One agent: a single remote call per invocation
#[async_trait]
pub trait Agent: Send + Sync {
    /// Role this agent plays
    fn role(&self) -> AgentRole;

    /// Send a message history and return the reply text
    async fn handle(&self, messages: &[Message]) -> Result<String, GatewayError>;
}

/// Resolves agents by role
///
/// An unknown or unconfigured role is a [`GatewayError::UnknownAgent`].
#[async_trait]
pub trait AgentGateway: Send + Sync {
    async fn agent(&self, role: AgentRole) -> Result<Arc<dyn Agent>, GatewayError>;
}
