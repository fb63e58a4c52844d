//! Domain layer for conductor
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Delegation
//!
//! A coordinator agent plans the work and embeds directives in its reply:
//!
//! - `[CODE_REQUEST: ...]`: the coder produces files
//! - `[BASE_VALIDATION_REQUEST: ...]`: the reviewer looks at something
//! - `[STRICT_VALIDATION_REQUEST: ...]`: the validator checks quality
//!
//! ## Write authority
//!
//! Only a project session in the EXECUTION phase may write to disk
//! ([`SessionState::can_write_disk`]). Before any directive runs in project
//! mode, the user's intent is classified SAFE or NON-SAFE; NON-SAFE intents
//! pause until the user confirms.

pub mod completeness;
pub mod config;
pub mod core;
pub mod delegation;
pub mod files;
pub mod orchestration;
pub mod prompt;
pub mod safety;
pub mod session;

// Re-export commonly used types
pub use completeness::{
    expected::{expected_files, missing_files},
    verdict::{CompletenessVerdict, is_invalid},
};
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use delegation::{
    entities::{AgentRole, Delegation, DelegationResult},
    parser::{dedupe_by_target, has_delegations, parse_delegations},
};
pub use files::{
    extractor::{NearMiss, NearMissShape, ParsedFile, extract_files, near_misses},
    outcome::{FileWriteOutcome, WriteStatus},
    policy::{WriteRejection, is_reviewable, validate_write_path},
};
pub use orchestration::{
    follow_up::build_follow_up,
    pending::{PendingAction, ResumableContext},
};
pub use prompt::DelegationPromptTemplate;
pub use safety::{
    challenge::generate_challenge,
    classifier::{Classification, SafetyClassifier, SafetyReason, SafetyRules},
};
pub use session::{
    entities::{Message, Role},
    state::{Mode, Phase, ProjectSession, ProjectState, SessionState, SessionStateError},
};
