//! Project storage adapters.

mod local;

pub use local::LocalProjectStorage;
