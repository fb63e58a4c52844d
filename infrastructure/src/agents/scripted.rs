//! Scripted agent gateway
//!
//! Replays canned replies read from a TOML script, one queue per role:
//!
//! ```toml
//! coordinator = ["Done: calc.py is ready."]
//! coder = ["# calc.py\n```python\ndef add(a, b):\n    return a + b\n```"]
//! validator = ["VALIDE"]
//! reviewer = ["## calc.py\n- Functions: add(a, b)"]
//! ```
//!
//! A role absent from the script is unknown to the gateway. A role whose
//! queue ran dry answers with [`GatewayError::ScriptExhausted`].

use async_trait::async_trait;
use conductor_application::ports::agent_gateway::{Agent, AgentGateway, GatewayError};
use conductor_domain::{AgentRole, Message};
use serde::Deserialize;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info};

/// Errors while loading a reply script
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("Could not read script {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid script: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ReplyScript {
    coordinator: Option<Vec<String>>,
    coder: Option<Vec<String>>,
    reviewer: Option<Vec<String>>,
    validator: Option<Vec<String>>,
}

type Queue = Arc<Mutex<VecDeque<String>>>;

/// Gateway answering every agent call from a reply script
#[derive(Debug, Clone, Default)]
pub struct ScriptedAgentGateway {
    queues: HashMap<AgentRole, Queue>,
}

impl ScriptedAgentGateway {
    pub fn from_toml_str(script: &str) -> Result<Self, ScriptError> {
        let script: ReplyScript = toml::from_str(script)?;
        let mut gateway = Self::default();
        for (role, replies) in [
            (AgentRole::Coordinator, script.coordinator),
            (AgentRole::Coder, script.coder),
            (AgentRole::Reviewer, script.reviewer),
            (AgentRole::Validator, script.validator),
        ] {
            if let Some(replies) = replies {
                gateway = gateway.with_replies(role, replies);
            }
        }
        Ok(gateway)
    }

    pub fn from_file(path: &Path) -> Result<Self, ScriptError> {
        let script = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let gateway = Self::from_toml_str(&script)?;
        info!(
            "Loaded reply script {} ({} role(s))",
            path.display(),
            gateway.queues.len()
        );
        Ok(gateway)
    }

    /// Queue `replies` for `role`, after any already queued
    pub fn with_replies<I, S>(mut self, role: AgentRole, replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queue = self.queues.entry(role).or_default();
        if let Ok(mut queue) = queue.lock() {
            queue.extend(replies.into_iter().map(Into::into));
        }
        self
    }

    /// Replies left for `role`
    pub fn remaining(&self, role: AgentRole) -> usize {
        self.queues
            .get(&role)
            .and_then(|q| q.lock().ok().map(|q| q.len()))
            .unwrap_or(0)
    }
}

struct ScriptedAgent {
    role: AgentRole,
    queue: Queue,
}

#[async_trait]
impl Agent for ScriptedAgent {
    fn role(&self) -> AgentRole {
        self.role
    }

    async fn handle(&self, messages: &[Message]) -> Result<String, GatewayError> {
        let reply = self
            .queue
            .lock()
            .map_err(|e| GatewayError::Other(e.to_string()))?
            .pop_front();
        debug!(
            "{} scripted reply for {} message(s): {}",
            self.role,
            messages.len(),
            if reply.is_some() { "ok" } else { "exhausted" }
        );
        reply.ok_or(GatewayError::ScriptExhausted(self.role))
    }
}

#[async_trait]
impl AgentGateway for ScriptedAgentGateway {
    async fn agent(&self, role: AgentRole) -> Result<Arc<dyn Agent>, GatewayError> {
        let queue = self
            .queues
            .get(&role)
            .ok_or(GatewayError::UnknownAgent(role))?;
        Ok(Arc::new(ScriptedAgent {
            role,
            queue: Arc::clone(queue),
        }))
    }
}
