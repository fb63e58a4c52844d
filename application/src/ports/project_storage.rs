//! Project storage port
//!
//! Raw file I/O under a project root. Paths handed to the port have already
//! passed the write policy; the port only performs the I/O.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a file: {0}")]
    NotAFile(PathBuf),
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}

/// File access relative to a project root
pub trait ProjectStorage: Send + Sync {
    /// Create parent directories and overwrite `root/relative`; returns bytes written
    fn write(&self, root: &Path, relative: &Path, content: &str) -> Result<usize, StorageError>;

    /// Read `root/relative` as UTF-8
    fn read_to_string(&self, root: &Path, relative: &Path) -> Result<String, StorageError>;
}
