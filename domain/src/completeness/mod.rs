//! Completeness of a code delegation.
//!
//! - [`expected`]: which files an instruction asks for
//! - [`verdict`]: verifier and validator reply tokens

pub mod expected;
pub mod verdict;
