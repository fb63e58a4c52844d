use async_trait::async_trait;
use conductor_application::ports::pending_action_store::{PendingActionStore, StoreError};
use conductor_domain::PendingAction;
use std::fmt::Write;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Pending actions stored as `<dir>/<conversation>.json`.
///
/// The file stem keeps `[A-Za-z0-9_-]` as is and percent-encodes every
/// other byte of the conversation id, so distinct ids never share a file.
/// Writes go through a temporary file and a rename so a reader never sees
/// half a document.
#[derive(Debug, Clone)]
pub struct JsonFilePendingActionStore {
    dir: PathBuf,
}

impl JsonFilePendingActionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, conversation_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(conversation_id)))
    }

    async fn read(&self, path: &Path) -> Result<Option<PendingAction>, StoreError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(path, e)),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| StoreError::Serialization(format!("{}: {}", path.display(), e)))
    }
}

fn file_stem(conversation_id: &str) -> String {
    let mut stem = String::with_capacity(conversation_id.len());
    for byte in conversation_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            stem.push(byte as char);
        } else {
            let _ = write!(stem, "%{:02X}", byte);
        }
    }
    stem
}

fn io_error(path: &Path, e: std::io::Error) -> StoreError {
    StoreError::Io(format!("{}: {}", path.display(), e))
}

#[async_trait]
impl PendingActionStore for JsonFilePendingActionStore {
    async fn get(&self, conversation_id: &str) -> Result<Option<PendingAction>, StoreError> {
        let path = self.path_for(conversation_id);
        let action = self.read(&path).await?;
        match action {
            Some(action) if action.conversation_id != conversation_id => {
                warn!(
                    "{} holds the action of '{}', not '{}'; ignoring it",
                    path.display(),
                    action.conversation_id,
                    conversation_id
                );
                Ok(None)
            }
            other => Ok(other),
        }
    }

    async fn put(&self, action: PendingAction) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(&self.dir, e))?;

        let path = self.path_for(&action.conversation_id);
        let json = serde_json::to_string_pretty(&action)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| io_error(&path, e))?;

        debug!("Stored pending action at {}", path.display());
        Ok(())
    }

    async fn delete(&self, conversation_id: &str) -> Result<Option<PendingAction>, StoreError> {
        let existing = self.get(conversation_id).await?;
        if existing.is_some() {
            let path = self.path_for(conversation_id);
            match tokio::fs::remove_file(&path).await {
                Ok(()) => debug!("Removed pending action {}", path.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(io_error(&path, e)),
            }
        }
        Ok(existing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conductor_domain::{
        Message, Phase, ProjectState, ResumableContext, SafetyClassifier, SessionState,
        parse_delegations,
    };

    fn action(conversation_id: &str) -> PendingAction {
        let intent = "refactor the api";
        let response = "Plan:\n[CODE_REQUEST: split api.py into routes.py and models.py]";
        let session = SessionState::project("demo", Phase::Reflexion)
            .with_project_state(ProjectState::Clean)
            .unwrap();
        PendingAction::new(
            conversation_id,
            intent,
            response,
            parse_delegations(response),
            SafetyClassifier::default().classify(intent, ProjectState::Clean, Phase::Reflexion),
            ResumableContext {
                history: vec![Message::user(intent)],
                project_root: Some(PathBuf::from("/work/demo")),
                session: Some(session),
            },
        )
    }

    #[tokio::test]
    async fn test_survives_a_new_store_instance() {
        let dir = tempfile::tempdir().unwrap();
        let original = action("conv-42");

        JsonFilePendingActionStore::new(dir.path())
            .put(original.clone())
            .await
            .unwrap();

        let reopened = JsonFilePendingActionStore::new(dir.path());
        let loaded = reopened.get("conv-42").await.unwrap().unwrap();
        assert_eq!(loaded, original);
        assert!(dir.path().join("conv-42.json").exists());
        assert!(!dir.path().join("conv-42.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_delete_returns_and_removes() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFilePendingActionStore::new(dir.path().join("pending"));

        assert!(store.get("c").await.unwrap().is_none());
        assert!(store.delete("c").await.unwrap().is_none());

        store.put(action("c")).await.unwrap();
        let removed = store.delete("c").await.unwrap().unwrap();
        assert_eq!(removed.conversation_id, "c");
        assert!(store.get("c").await.unwrap().is_none());
    }

    #[test]
    fn test_file_stem_encoding() {
        assert_eq!(file_stem("conv-42_a"), "conv-42_a");
        assert_eq!(file_stem("team.alpha"), "team%2Ealpha");
        assert_eq!(file_stem("../x"), "%2E%2E%2Fx");
        assert_eq!(file_stem("%41"), "%2541");
        assert_eq!(file_stem("é"), "%C3%A9");
    }

    #[tokio::test]
    async fn test_similar_ids_keep_separate_actions() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFilePendingActionStore::new(dir.path());

        store.put(action("team.alpha")).await.unwrap();

        assert!(store.get("team_alpha").await.unwrap().is_none());
        assert!(store.delete("team_alpha").await.unwrap().is_none());
        assert!(store.get("team.alpha").await.unwrap().is_some());

        store.put(action("team_alpha")).await.unwrap();
        let removed = store.delete("team_alpha").await.unwrap().unwrap();
        assert_eq!(removed.conversation_id, "team_alpha");

        let kept = store.get("team.alpha").await.unwrap().unwrap();
        assert_eq!(kept.conversation_id, "team.alpha");
    }

    #[tokio::test]
    async fn test_path_like_id_stays_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFilePendingActionStore::new(dir.path().join("pending"));

        store.put(action("../../etc/passwd")).await.unwrap();

        assert!(
            dir.path()
                .join("pending")
                .join("%2E%2E%2F%2E%2E%2Fetc%2Fpasswd.json")
                .exists()
        );
        let loaded = store.get("../../etc/passwd").await.unwrap().unwrap();
        assert_eq!(loaded.conversation_id, "../../etc/passwd");
    }

    #[tokio::test]
    async fn test_file_owned_by_another_id_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFilePendingActionStore::new(dir.path());
        let stray = serde_json::to_string(&action("someone-else")).unwrap();
        std::fs::write(dir.path().join("mine.json"), stray).unwrap();

        assert!(store.get("mine").await.unwrap().is_none());
        assert!(store.delete("mine").await.unwrap().is_none());
        assert!(dir.path().join("mine.json").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "{ not json").unwrap();

        let result = JsonFilePendingActionStore::new(dir.path()).get("bad").await;
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }
}
