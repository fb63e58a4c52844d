//! Orchestration progress port
//!
//! Callbacks fired while delegations run. Implementations live in the
//! presentation layer (the CLI prints them); every method has a no-op
//! default so implementers only override what they display.

use conductor_domain::{
    AgentRole, Classification, Delegation, DelegationResult, FileWriteOutcome,
};

pub trait OrchestrationProgress: Send + Sync {
    /// Called when a delegation round starts (round 0 is the initial reply)
    fn on_round_start(&self, _round: usize, _delegations: usize) {}

    /// Called before a delegation is dispatched
    fn on_delegation_start(&self, _delegation: &Delegation) {}

    /// Called at each pass boundary of a code delegation
    fn on_pass(&self, _role: AgentRole, _pass: u32, _max_passes: u32) {}

    /// Called after a batch of files went through the writer
    fn on_files_written(&self, _outcomes: &[FileWriteOutcome]) {}

    /// Called when consecutive empty passes stop a delegation
    fn on_stagnation(&self, _role: AgentRole, _pass: u32) {}

    /// Called when a delegation finished (successfully or not)
    fn on_delegation_complete(&self, _result: &DelegationResult) {}

    /// Called when the safety gate pauses the orchestration
    fn on_safety_pause(&self, _classification: &Classification) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl OrchestrationProgress for NoProgress {}
