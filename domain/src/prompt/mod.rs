//! Prompt domain
//!
//! Templates for the prompts the orchestrator sends to specialists.

mod delegation;

pub use delegation::DelegationPromptTemplate;
