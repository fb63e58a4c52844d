//! Safety gating of requested actions.
//!
//! Before any delegation may touch the disk in project mode, the user's
//! intent is classified SAFE or NON-SAFE. A NON-SAFE intent that requires
//! validation pauses the orchestration and the user is challenged with a
//! clarifying message.
//!
//! - [`classifier::SafetyClassifier`]: the rule cascade
//! - [`challenge::generate_challenge`]: the clarifying message shown to the user

pub mod challenge;
pub mod classifier;
