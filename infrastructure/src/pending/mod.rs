//! Pending action store adapters.
//!
//! - [`InMemoryPendingActionStore`]: process-local map, for embedding and tests
//! - [`JsonFilePendingActionStore`]: one JSON file per conversation, so a
//!   confirmation can arrive from a later process

mod json_file;
mod memory;

pub use json_file::JsonFilePendingActionStore;
pub use memory::InMemoryPendingActionStore;
