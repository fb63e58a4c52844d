//! Infrastructure layer for conductor
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod agents;
pub mod config;
pub mod logging;
pub mod pending;
pub mod storage;

// Re-export commonly used types
pub use agents::{ScriptError, ScriptedAgentGateway};
pub use config::{
    ConfigLoader, FileConfig, FileLoggingConfig, FileOutputConfig, FileOutputFormat,
    FileSafetyConfig, FileStorageConfig,
};
pub use logging::JsonlConversationLogger;
pub use pending::{InMemoryPendingActionStore, JsonFilePendingActionStore};
pub use storage::LocalProjectStorage;
