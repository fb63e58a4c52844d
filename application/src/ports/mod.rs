//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod agent_gateway;
pub mod conversation_logger;
pub mod pending_action_store;
pub mod progress;
pub mod project_storage;
