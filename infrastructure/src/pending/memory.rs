use async_trait::async_trait;
use conductor_application::ports::pending_action_store::{PendingActionStore, StoreError};
use conductor_domain::PendingAction;
use std::collections::HashMap;
use std::sync::Mutex;

/// Pending actions kept in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct InMemoryPendingActionStore {
    actions: Mutex<HashMap<String, PendingAction>>,
}

impl InMemoryPendingActionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, PendingAction>>, StoreError> {
        self.actions
            .lock()
            .map_err(|e| StoreError::Io(format!("pending action map poisoned: {}", e)))
    }
}

#[async_trait]
impl PendingActionStore for InMemoryPendingActionStore {
    async fn get(&self, conversation_id: &str) -> Result<Option<PendingAction>, StoreError> {
        Ok(self.lock()?.get(conversation_id).cloned())
    }

    async fn put(&self, action: PendingAction) -> Result<(), StoreError> {
        self.lock()?.insert(action.conversation_id.clone(), action);
        Ok(())
    }

    async fn delete(&self, conversation_id: &str) -> Result<Option<PendingAction>, StoreError> {
        Ok(self.lock()?.remove(conversation_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conductor_domain::{
        Message, Phase, ProjectState, ResumableContext, SafetyClassifier, SessionState,
        parse_delegations,
    };

    fn action(conversation_id: &str, intent: &str) -> PendingAction {
        let response = "[CODE_REQUEST: rename utils.py]";
        PendingAction::new(
            conversation_id,
            intent,
            response,
            parse_delegations(response),
            SafetyClassifier::default().classify(intent, ProjectState::Clean, Phase::Reflexion),
            ResumableContext {
                history: vec![Message::user(intent)],
                project_root: None,
                session: Some(SessionState::project("p", Phase::Reflexion)),
            },
        )
    }

    #[tokio::test]
    async fn test_one_action_per_conversation() {
        let store = InMemoryPendingActionStore::new();
        store.put(action("c1", "rename utils")).await.unwrap();
        store.put(action("c1", "move utils")).await.unwrap();
        store.put(action("c2", "delete tests")).await.unwrap();

        let stored = store.get("c1").await.unwrap().unwrap();
        assert_eq!(stored.user_intent, "move utils");

        let removed = store.delete("c1").await.unwrap();
        assert!(removed.is_some());
        assert!(store.get("c1").await.unwrap().is_none());
        assert!(store.delete("c1").await.unwrap().is_none());
        assert!(store.get("c2").await.unwrap().is_some());
    }
}
