//! Shared utilities for use cases.
//!
//! Every agent call goes through [`ask_agent`] so that the conversation log
//! sees each request, reply and failure exactly once.

use crate::ports::agent_gateway::{AgentGateway, GatewayError};
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use conductor_domain::core::string::truncate;
use conductor_domain::{AgentRole, Message};
use tracing::debug;

/// Resolve `role` through the gateway and send it `messages`.
pub(crate) async fn ask_agent(
    gateway: &dyn AgentGateway,
    logger: &dyn ConversationLogger,
    role: AgentRole,
    messages: &[Message],
) -> Result<String, GatewayError> {
    logger.log(ConversationEvent::agent_request(role, messages));

    let outcome = match gateway.agent(role).await {
        Ok(agent) => agent.handle(messages).await,
        Err(e) => Err(e),
    };

    match &outcome {
        Ok(text) => {
            debug!("{} replied ({} chars): {}", role, text.len(), truncate(text, 100));
            logger.log(ConversationEvent::agent_reply(role, text));
        }
        Err(e) => logger.log(ConversationEvent::agent_error(role, &e.to_string())),
    }
    outcome
}

/// Send a single user prompt to `role`.
pub(crate) async fn ask_agent_prompt(
    gateway: &dyn AgentGateway,
    logger: &dyn ConversationLogger,
    role: AgentRole,
    prompt: String,
) -> Result<String, GatewayError> {
    ask_agent(gateway, logger, role, &[Message::user(prompt)]).await
}
