//! In-memory fakes for use case tests.

use crate::ports::agent_gateway::{Agent, AgentGateway, GatewayError};
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::pending_action_store::{PendingActionStore, StoreError};
use crate::ports::project_storage::{ProjectStorage, StorageError};
use async_trait::async_trait;
use conductor_domain::{AgentRole, Message, PendingAction};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// ==================== Agents ====================

#[derive(Default)]
struct Script {
    replies: HashMap<AgentRole, VecDeque<Result<String, GatewayError>>>,
    calls: Vec<(AgentRole, Vec<Message>)>,
}

/// Gateway replaying queued replies per role, recording every call.
#[derive(Clone, Default)]
pub(crate) struct ScriptedGateway {
    script: Arc<Mutex<Script>>,
}

impl ScriptedGateway {
    pub(crate) fn reply(self, role: AgentRole, text: &str) -> Self {
        self.push(role, Ok(text.to_string()));
        self
    }

    pub(crate) fn fail(self, role: AgentRole, error: &str) -> Self {
        self.push(role, Err(GatewayError::RequestFailed(error.to_string())));
        self
    }

    fn push(&self, role: AgentRole, reply: Result<String, GatewayError>) {
        self.script
            .lock()
            .unwrap()
            .replies
            .entry(role)
            .or_default()
            .push_back(reply);
    }

    /// Roles called, in order.
    pub(crate) fn roles_called(&self) -> Vec<AgentRole> {
        self.script.lock().unwrap().calls.iter().map(|(r, _)| *r).collect()
    }

    /// Messages of every call made to `role`.
    pub(crate) fn calls_to(&self, role: AgentRole) -> Vec<Vec<Message>> {
        self.script
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|(r, _)| *r == role)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub(crate) fn remaining(&self, role: AgentRole) -> usize {
        self.script
            .lock()
            .unwrap()
            .replies
            .get(&role)
            .map(|q| q.len())
            .unwrap_or(0)
    }
}

struct ScriptedAgent {
    role: AgentRole,
    script: Arc<Mutex<Script>>,
}

#[async_trait]
impl Agent for ScriptedAgent {
    fn role(&self) -> AgentRole {
        self.role
    }

    async fn handle(&self, messages: &[Message]) -> Result<String, GatewayError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push((self.role, messages.to_vec()));
        script
            .replies
            .get_mut(&self.role)
            .and_then(|q| q.pop_front())
            .unwrap_or(Err(GatewayError::ScriptExhausted(self.role)))
    }
}

#[async_trait]
impl AgentGateway for ScriptedGateway {
    async fn agent(&self, role: AgentRole) -> Result<Arc<dyn Agent>, GatewayError> {
        Ok(Arc::new(ScriptedAgent {
            role,
            script: self.script.clone(),
        }))
    }
}

// ==================== Storage ====================

/// Project storage backed by a map from relative path to content.
#[derive(Default)]
pub(crate) struct MemoryStorage {
    files: Mutex<HashMap<PathBuf, String>>,
    writes: Mutex<usize>,
    failing: Option<PathBuf>,
}

impl MemoryStorage {
    pub(crate) fn failing_on(mut self, path: &str) -> Self {
        self.failing = Some(PathBuf::from(path));
        self
    }

    pub(crate) fn get(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(Path::new(path)).cloned()
    }

    pub(crate) fn write_count(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

impl ProjectStorage for MemoryStorage {
    fn write(&self, root: &Path, relative: &Path, content: &str) -> Result<usize, StorageError> {
        if self.failing.as_deref() == Some(relative) {
            return Err(StorageError::io(
                root.join(relative),
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            ));
        }
        *self.writes.lock().unwrap() += 1;
        self.files
            .lock()
            .unwrap()
            .insert(relative.to_path_buf(), content.to_string());
        Ok(content.len())
    }

    fn read_to_string(&self, root: &Path, relative: &Path) -> Result<String, StorageError> {
        self.files
            .lock()
            .unwrap()
            .get(relative)
            .cloned()
            .ok_or_else(|| StorageError::NotAFile(root.join(relative)))
    }
}

// ==================== Pending actions ====================

#[derive(Default)]
pub(crate) struct MemoryStore {
    actions: Mutex<HashMap<String, PendingAction>>,
}

#[async_trait]
impl PendingActionStore for MemoryStore {
    async fn get(&self, conversation_id: &str) -> Result<Option<PendingAction>, StoreError> {
        Ok(self.actions.lock().unwrap().get(conversation_id).cloned())
    }

    async fn put(&self, action: PendingAction) -> Result<(), StoreError> {
        self.actions
            .lock()
            .unwrap()
            .insert(action.conversation_id.clone(), action);
        Ok(())
    }

    async fn delete(&self, conversation_id: &str) -> Result<Option<PendingAction>, StoreError> {
        Ok(self.actions.lock().unwrap().remove(conversation_id))
    }
}

// ==================== Conversation log ====================

/// Logger keeping every event in memory.
#[derive(Default)]
pub(crate) struct RecordingLogger {
    events: Mutex<Vec<ConversationEvent>>,
}

impl RecordingLogger {
    pub(crate) fn events(&self) -> Vec<ConversationEvent> {
        self.events.lock().unwrap().clone()
    }

    /// The `type` tags logged, in order, skipping agent traffic.
    pub(crate) fn decisions(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(ConversationEvent::kind)
            .filter(|kind| !kind.starts_with("agent_"))
            .collect()
    }
}

impl ConversationLogger for RecordingLogger {
    fn log(&self, event: ConversationEvent) {
        self.events.lock().unwrap().push(event);
    }
}
