//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod execute_delegation;
pub mod orchestrate;
pub(crate) mod shared;
pub mod verify_completeness;
pub mod write_files;
