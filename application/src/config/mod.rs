//! Application-level configuration.
//!
//! - [`OrchestrationPolicy`]: pass budgets, stagnation and relance limits

pub mod policy;

pub use policy::OrchestrationPolicy;
