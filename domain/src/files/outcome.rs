//! Per-file write outcomes

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteStatus {
    /// The file is on disk.
    Written,
    /// The path or extension failed the write policy.
    Rejected,
    /// The session state does not allow disk writes.
    Blocked,
    /// Storage failed while writing.
    Error,
}

impl WriteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteStatus::Written => "written",
            WriteStatus::Rejected => "rejected",
            WriteStatus::Blocked => "blocked",
            WriteStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for WriteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileWriteOutcome {
    pub path: String,
    pub status: WriteStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileWriteOutcome {
    pub fn written(path: impl Into<String>, bytes: usize) -> Self {
        Self {
            path: path.into(),
            status: WriteStatus::Written,
            bytes: Some(bytes),
            error: None,
        }
    }

    pub fn rejected(path: impl Into<String>, error: impl ToString) -> Self {
        Self::failure(path, WriteStatus::Rejected, error)
    }

    pub fn blocked(path: impl Into<String>, error: impl ToString) -> Self {
        Self::failure(path, WriteStatus::Blocked, error)
    }

    pub fn error(path: impl Into<String>, error: impl ToString) -> Self {
        Self::failure(path, WriteStatus::Error, error)
    }

    fn failure(path: impl Into<String>, status: WriteStatus, error: impl ToString) -> Self {
        Self {
            path: path.into(),
            status,
            bytes: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_written(&self) -> bool {
        self.status == WriteStatus::Written
    }
}
