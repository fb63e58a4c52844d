//! Application layer for conductor
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::OrchestrationPolicy;
pub use ports::{
    agent_gateway::{Agent, AgentGateway, GatewayError},
    conversation_logger::{
        ConversationEvent, ConversationLogger, NoConversationLogger, PendingTransition,
        VerdictCheck,
    },
    pending_action_store::{PendingActionStore, StoreError},
    progress::{NoProgress, OrchestrationProgress},
    project_storage::{ProjectStorage, StorageError},
};
pub use use_cases::execute_delegation::{DelegationExecutor, Workspace};
pub use use_cases::orchestrate::{OrchestrationError, Orchestrator, SubmitInput, SubmitOutput};
pub use use_cases::verify_completeness::CompletenessVerifier;
pub use use_cases::write_files::FileWriter;
