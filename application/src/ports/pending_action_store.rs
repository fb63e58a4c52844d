//! Pending action store port
//!
//! Key-value store from conversation id to the one [`PendingAction`] paused
//! for that conversation. `put` replaces any previous entry.

use async_trait::async_trait;
use conductor_domain::PendingAction;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[async_trait]
pub trait PendingActionStore: Send + Sync {
    async fn get(&self, conversation_id: &str) -> Result<Option<PendingAction>, StoreError>;

    async fn put(&self, action: PendingAction) -> Result<(), StoreError>;

    /// Remove and return the entry, if any
    async fn delete(&self, conversation_id: &str) -> Result<Option<PendingAction>, StoreError>;
}
