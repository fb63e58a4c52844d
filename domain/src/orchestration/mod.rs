//! Orchestration domain.
//!
//! - [`pending::PendingAction`]: an action paused by the safety gate
//! - [`follow_up::build_follow_up`]: the round summary sent back to the coordinator

pub mod follow_up;
pub mod pending;
