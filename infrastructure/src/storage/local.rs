//! Local filesystem implementation of [`ProjectStorage`].

use conductor_application::ports::project_storage::{ProjectStorage, StorageError};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Reads and writes files under a project root with `std::fs`.
///
/// Paths are trusted: the write policy has already resolved them under the
/// root before they reach the adapter.
#[derive(Debug, Clone, Default)]
pub struct LocalProjectStorage;

impl LocalProjectStorage {
    pub fn new() -> Self {
        Self
    }
}

impl ProjectStorage for LocalProjectStorage {
    fn write(&self, root: &Path, relative: &Path, content: &str) -> Result<usize, StorageError> {
        let target = root.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }
        fs::write(&target, content).map_err(|e| StorageError::io(&target, e))?;
        debug!("Wrote {} ({} bytes)", target.display(), content.len());
        Ok(content.len())
    }

    fn read_to_string(&self, root: &Path, relative: &Path) -> Result<String, StorageError> {
        let target = root.join(relative);
        if target.is_dir() {
            return Err(StorageError::NotAFile(target));
        }
        fs::read_to_string(&target).map_err(|e| StorageError::io(&target, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conductor_application::FileWriter;
    use conductor_domain::{ParsedFile, Phase, SessionState, WriteStatus};
    use std::sync::Arc;

    fn file(path: &str, content: &str) -> ParsedFile {
        ParsedFile {
            path: path.to_string(),
            content: content.to_string(),
        }
    }

    fn writer() -> FileWriter {
        FileWriter::new(Arc::new(LocalProjectStorage::new()))
    }

    #[test]
    fn test_write_creates_parents_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalProjectStorage::new();

        let bytes = storage
            .write(dir.path(), Path::new("src/pkg/mod.py"), "old\n")
            .unwrap();
        assert_eq!(bytes, 4);
        storage
            .write(dir.path(), Path::new("src/pkg/mod.py"), "new\n")
            .unwrap();

        let content = storage
            .read_to_string(dir.path(), Path::new("src/pkg/mod.py"))
            .unwrap();
        assert_eq!(content, "new\n");
    }

    #[test]
    fn test_read_directory_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        let result = LocalProjectStorage::new().read_to_string(dir.path(), Path::new("src"));
        assert!(matches!(result, Err(StorageError::NotAFile(_))));
    }

    #[test]
    fn test_round_trip_through_file_writer() {
        let dir = tempfile::tempdir().unwrap();
        let session = SessionState::project("p", Phase::Execution);

        let outcomes = writer().write(dir.path(), &[file("a.py", "x=1")], &session);

        assert_eq!(outcomes[0].status, WriteStatus::Written);
        assert_eq!(fs::read_to_string(dir.path().join("a.py")).unwrap(), "x=1\n");
    }

    #[test]
    fn test_traversal_is_rejected_and_nothing_escapes() {
        let outer = tempfile::tempdir().unwrap();
        let root = outer.path().join("project");
        fs::create_dir(&root).unwrap();
        let session = SessionState::project("p", Phase::Execution);

        let outcomes = writer().write(&root, &[file("../evil.py", "boom")], &session);

        assert_eq!(outcomes[0].status, WriteStatus::Rejected);
        assert!(!outer.path().join("evil.py").exists());
    }

    #[test]
    fn test_blocked_session_leaves_disk_untouched() {
        let dir = tempfile::tempdir().unwrap();

        for session in [SessionState::chat(), SessionState::project("p", Phase::Reflexion)] {
            let outcomes = writer().write(dir.path(), &[file("a.py", "x=1")], &session);
            assert_eq!(outcomes[0].status, WriteStatus::Blocked);
        }
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
