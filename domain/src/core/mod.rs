//! Core domain concepts shared across all subdomains.
//!
//! - [`string`]: UTF-8 safe truncation and path normalization helpers

pub mod string;
