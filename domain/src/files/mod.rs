//! Files produced by specialists.
//!
//! - [`extractor`]: finds `{path, content}` pairs in a specialist reply
//! - [`policy`]: which relative paths may be written
//! - [`outcome`]: per-file write results

pub mod extractor;
pub mod outcome;
pub mod policy;
