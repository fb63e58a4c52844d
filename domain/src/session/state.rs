//! Session state: the write-authority state machine.
//!
//! [`SessionState`] is a tagged union: a `Chat` session carries nothing,
//! a `Project` session always carries its project id and [`Phase`], and
//! optionally the [`ProjectState`] determined by project analysis.
//! Illegal combinations (a chat with a phase, a project without one) cannot
//! be constructed.
//!
//! ```text
//!              transition_to_execution()
//!   REFLEXION ───────────────────────────▶ EXECUTION
//!       ▲                                      │
//!       └──────────────────────────────────────┘
//!              transition_to_reflexion()
//! ```
//!
//! [`SessionState::can_write_disk`] is the single authoritative gate for
//! disk mutation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Operating mode of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Chat,
    Project,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Chat => "chat",
            Mode::Project => "project",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Internal phase of a project session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Thinking and planning; nothing may touch the disk.
    Reflexion,
    /// Writing is authorized.
    Execution,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Reflexion => "reflexion",
            Phase::Execution => "execution",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reflexion" | "reflection" => Ok(Phase::Reflexion),
            "execution" => Ok(Phase::Execution),
            other => Err(format!("unknown phase '{}'", other)),
        }
    }
}

/// State of the analyzed project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectState {
    /// Empty or nearly empty directory.
    New,
    /// Existing code without detected debt.
    Clean,
    /// Technical debt detected.
    Debt,
}

impl ProjectState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectState::New => "new",
            ProjectState::Clean => "clean",
            ProjectState::Debt => "debt",
        }
    }
}

impl std::fmt::Display for ProjectState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProjectState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "new" => Ok(ProjectState::New),
            "clean" => Ok(ProjectState::Clean),
            "debt" => Ok(ProjectState::Debt),
            other => Err(format!("unknown project state '{}'", other)),
        }
    }
}

/// Errors raised by illegal state-machine operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionStateError {
    #[error("phase transitions and project state require project mode")]
    NotProjectMode,

    #[error("cannot transition to {to} from phase {from}")]
    InvalidTransition { from: Phase, to: Phase },
}

/// Fields carried by a project-mode session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSession {
    pub project_id: String,
    pub phase: Phase,
    /// Unset until project analysis has run.
    pub project_state: Option<ProjectState>,
}

/// Current write authority of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum SessionState {
    Chat,
    Project(ProjectSession),
}

impl SessionState {
    pub fn chat() -> Self {
        SessionState::Chat
    }

    /// A project session in the given phase, before analysis.
    pub fn project(project_id: impl Into<String>, phase: Phase) -> Self {
        SessionState::Project(ProjectSession {
            project_id: project_id.into(),
            phase,
            project_state: None,
        })
    }

    /// Initial state for a conversation: project sessions start in REFLEXION.
    pub fn for_conversation(project_id: Option<&str>) -> Self {
        match project_id {
            Some(id) => Self::project(id, Phase::Reflexion),
            None => Self::chat(),
        }
    }

    /// Builder-style variant of [`set_project_state`](Self::set_project_state).
    pub fn with_project_state(mut self, state: ProjectState) -> Result<Self, SessionStateError> {
        self.set_project_state(state)?;
        Ok(self)
    }

    pub fn mode(&self) -> Mode {
        match self {
            SessionState::Chat => Mode::Chat,
            SessionState::Project(_) => Mode::Project,
        }
    }

    pub fn phase(&self) -> Option<Phase> {
        match self {
            SessionState::Chat => None,
            SessionState::Project(p) => Some(p.phase),
        }
    }

    pub fn project_state(&self) -> Option<ProjectState> {
        match self {
            SessionState::Chat => None,
            SessionState::Project(p) => p.project_state,
        }
    }

    pub fn project_id(&self) -> Option<&str> {
        match self {
            SessionState::Chat => None,
            SessionState::Project(p) => Some(p.project_id.as_str()),
        }
    }

    pub fn is_project(&self) -> bool {
        matches!(self, SessionState::Project(_))
    }

    /// REFLEXION → EXECUTION. Not idempotent: fails from EXECUTION.
    pub fn transition_to_execution(&mut self) -> Result<(), SessionStateError> {
        self.transition(Phase::Reflexion, Phase::Execution)
    }

    /// EXECUTION → REFLEXION. Not idempotent: fails from REFLEXION.
    pub fn transition_to_reflexion(&mut self) -> Result<(), SessionStateError> {
        self.transition(Phase::Execution, Phase::Reflexion)
    }

    fn transition(&mut self, from: Phase, to: Phase) -> Result<(), SessionStateError> {
        match self {
            SessionState::Chat => Err(SessionStateError::NotProjectMode),
            SessionState::Project(p) if p.phase == from => {
                p.phase = to;
                Ok(())
            }
            SessionState::Project(p) => Err(SessionStateError::InvalidTransition { from: p.phase, to }),
        }
    }

    /// Record the result of project analysis.
    pub fn set_project_state(&mut self, state: ProjectState) -> Result<(), SessionStateError> {
        match self {
            SessionState::Chat => Err(SessionStateError::NotProjectMode),
            SessionState::Project(p) => {
                p.project_state = Some(state);
                Ok(())
            }
        }
    }

    /// Whether disk writes are authorized: project mode in EXECUTION.
    pub fn can_write_disk(&self) -> bool {
        matches!(
            self,
            SessionState::Project(ProjectSession {
                phase: Phase::Execution,
                ..
            })
        )
    }

    /// Whether the state alone mandates user validation.
    ///
    /// Only a DEBT project in EXECUTION does; NEW and CLEAN projects return
    /// `false` and leave the decision to the safety classifier.
    pub fn require_validation(&self) -> bool {
        matches!(
            self,
            SessionState::Project(ProjectSession {
                phase: Phase::Execution,
                project_state: Some(ProjectState::Debt),
                ..
            })
        )
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Chat => write!(f, "mode=chat"),
            SessionState::Project(p) => write!(
                f,
                "mode=project, project={}, phase={}, state={}",
                p.project_id,
                p.phase,
                p.project_state.map(|s| s.as_str()).unwrap_or("unknown")
            ),
        }
    }
}
