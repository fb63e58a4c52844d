//! Orchestrate use case
//!
//! Drives a coordinator reply through the delegation protocol:
//!
//! ```text
//! parse directives ─► safety gate ─► execute (sequential) ─► follow-up ─► coordinator
//!        ▲               │ NON-SAFE                                          │
//!        │               ▼                                                   │
//!        │        store PendingAction,                                       │
//!        │        return challenge                                           │
//!        └──────────── new directives and relances left ◄────────────────────┘
//! ```
//!
//! A paused action is resumed with [`Orchestrator::confirm`], which replays
//! the stored reply with the gate bypassed, or dropped with
//! [`Orchestrator::cancel`].

use crate::config::OrchestrationPolicy;
use crate::ports::agent_gateway::AgentGateway;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger, PendingTransition,
};
use crate::ports::pending_action_store::{PendingActionStore, StoreError};
use crate::ports::progress::{NoProgress, OrchestrationProgress};
use crate::ports::project_storage::ProjectStorage;
use crate::use_cases::execute_delegation::{DelegationExecutor, Workspace};
use crate::use_cases::shared::{ask_agent, ask_agent_prompt};
use conductor_domain::core::string::truncate;
use conductor_domain::session::entities::{joined_user_prompts, latest_user_intent};
use conductor_domain::{
    AgentRole, DelegationPromptTemplate, DelegationResult, Message, PendingAction, Phase,
    ProjectState, ResumableContext, SafetyClassifier, SafetyRules, SessionState,
    build_follow_up, dedupe_by_target, generate_challenge, has_delegations, parse_delegations,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during orchestration
#[derive(Error, Debug)]
pub enum OrchestrationError {
    #[error("Nothing pending for conversation '{0}'")]
    NothingPending(String),

    #[error("Pending action store error: {0}")]
    Store(#[from] StoreError),
}

/// Input for [`Orchestrator::submit`]
#[derive(Debug, Clone)]
pub struct SubmitInput {
    pub conversation_id: String,
    /// The coordinator reply that may carry directives
    pub coordinator_response: String,
    /// Conversation so far, ending with the user's request
    pub history: Vec<Message>,
    /// Where code delegations write; without it coder output stays text
    pub project_root: Option<PathBuf>,
    /// Current write authority; `None` is treated like a session without disk access
    pub session: Option<SessionState>,
}

impl SubmitInput {
    pub fn new(conversation_id: impl Into<String>, coordinator_response: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            coordinator_response: coordinator_response.into(),
            history: Vec::new(),
            project_root: None,
            session: None,
        }
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.history = history;
        self
    }

    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    pub fn with_session(mut self, session: SessionState) -> Self {
        self.session = Some(session);
        self
    }
}

/// What the caller gets back
#[derive(Debug, Clone, Serialize)]
pub struct SubmitOutput {
    /// Final coordinator text, or the safety challenge
    pub text: String,
    /// Every delegation executed, across rounds
    pub delegations: Vec<DelegationResult>,
    /// Session state after execution (may have switched to EXECUTION)
    pub session: Option<SessionState>,
    /// True when the safety gate paused the run
    pub awaiting_confirmation: bool,
}

/// Use case driving the delegation protocol
pub struct Orchestrator {
    gateway: Arc<dyn AgentGateway>,
    store: Arc<dyn PendingActionStore>,
    executor: DelegationExecutor,
    classifier: SafetyClassifier,
    policy: OrchestrationPolicy,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl Orchestrator {
    pub fn new(
        gateway: Arc<dyn AgentGateway>,
        storage: Arc<dyn ProjectStorage>,
        store: Arc<dyn PendingActionStore>,
    ) -> Self {
        Self {
            executor: DelegationExecutor::new(gateway.clone(), storage),
            gateway,
            store,
            classifier: SafetyClassifier::default(),
            policy: OrchestrationPolicy::default(),
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_policy(mut self, policy: OrchestrationPolicy) -> Self {
        self.executor = self.executor.with_policy(policy.clone());
        self.policy = policy;
        self
    }

    pub fn with_safety_rules(mut self, rules: SafetyRules) -> Self {
        self.classifier = SafetyClassifier::new(rules);
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.executor = self.executor.with_conversation_logger(logger.clone());
        self.conversation_logger = logger;
        self
    }

    // ==================== Operations ====================

    /// Process a coordinator reply with default (no-op) progress
    pub async fn submit(&self, input: SubmitInput) -> Result<SubmitOutput, OrchestrationError> {
        self.submit_with_progress(input, &NoProgress).await
    }

    /// Process a coordinator reply with progress callbacks
    pub async fn submit_with_progress(
        &self,
        input: SubmitInput,
        progress: &dyn OrchestrationProgress,
    ) -> Result<SubmitOutput, OrchestrationError> {
        let context = ResumableContext {
            history: input.history,
            project_root: input.project_root,
            session: input.session,
        };
        self.process(
            &input.conversation_id,
            input.coordinator_response,
            context,
            false,
            progress,
        )
        .await
    }

    /// Resume the action paused for `conversation_id`
    pub async fn confirm(&self, conversation_id: &str) -> Result<SubmitOutput, OrchestrationError> {
        self.confirm_with_progress(conversation_id, &NoProgress).await
    }

    /// Resume the paused action with progress callbacks.
    ///
    /// The stored reply is replayed with the safety gate bypassed for the
    /// whole invocation. The action is consumed; a second call fails with
    /// [`OrchestrationError::NothingPending`].
    pub async fn confirm_with_progress(
        &self,
        conversation_id: &str,
        progress: &dyn OrchestrationProgress,
    ) -> Result<SubmitOutput, OrchestrationError> {
        let Some(mut action) = self.store.get(conversation_id).await? else {
            return Err(OrchestrationError::NothingPending(conversation_id.to_string()));
        };

        info!(
            "Confirmed pending action for '{}': {}",
            conversation_id,
            truncate(&action.user_intent, 100)
        );
        action.confirm();
        self.store.put(action.clone()).await?;
        self.conversation_logger
            .log(ConversationEvent::pending(&action, PendingTransition::Confirmed));

        let output = self
            .process(
                conversation_id,
                action.original_response,
                action.context,
                true,
                progress,
            )
            .await;

        self.store.delete(conversation_id).await?;
        output
    }

    /// Drop the action paused for `conversation_id`
    pub async fn cancel(&self, conversation_id: &str) -> Result<PendingAction, OrchestrationError> {
        match self.store.delete(conversation_id).await? {
            Some(action) => {
                info!("Cancelled pending action for '{}'", conversation_id);
                self.conversation_logger
                    .log(ConversationEvent::pending(&action, PendingTransition::Cancelled));
                Ok(action)
            }
            None => Err(OrchestrationError::NothingPending(conversation_id.to_string())),
        }
    }

    /// The action paused for `conversation_id`, if any
    pub async fn pending(&self, conversation_id: &str) -> Result<Option<PendingAction>, OrchestrationError> {
        Ok(self.store.get(conversation_id).await?)
    }

    // ==================== Delegation loop ====================

    async fn process(
        &self,
        conversation_id: &str,
        response: String,
        context: ResumableContext,
        bypass: bool,
        progress: &dyn OrchestrationProgress,
    ) -> Result<SubmitOutput, OrchestrationError> {
        let ResumableContext {
            history,
            project_root,
            mut session,
        } = context;

        let intent = latest_user_intent(&history).to_string();
        let user_prompts = joined_user_prompts(&history);
        let mut running_history = history.clone();
        let mut current = response;
        let mut results: Vec<DelegationResult> = Vec::new();
        let mut pending_cleared = false;
        let max_rounds = self.policy.max_rounds();

        for round in 0..max_rounds {
            let (delegations, dropped) = dedupe_by_target(parse_delegations(&current));
            if delegations.is_empty() {
                debug!("Round {}: no delegation", round);
                break;
            }
            for duplicate in &dropped {
                warn!(
                    "Dropped duplicate {} directive: {}",
                    duplicate.target,
                    truncate(&duplicate.instruction, 60)
                );
            }

            // Safety gate
            if !bypass {
                if let Some(state) = session.as_ref().filter(|s| s.is_project()) {
                    let project_state = state.project_state().unwrap_or(ProjectState::New);
                    let phase = state.phase().unwrap_or(Phase::Reflexion);
                    let classification = self.classifier.classify(&intent, project_state, phase);
                    debug!("Safety classification: {:?}", classification);

                    if classification.blocks() {
                        info!("Paused on NON-SAFE action: {}", classification.reason);
                        progress.on_safety_pause(&classification);
                        self.conversation_logger.log(ConversationEvent::Pending {
                            conversation_id: conversation_id.to_string(),
                            transition: PendingTransition::Paused,
                            reason: classification.reason.to_string(),
                            delegations: delegations.len(),
                        });
                        let challenge =
                            generate_challenge(&intent, &classification, state.project_state());
                        let action = PendingAction::new(
                            conversation_id,
                            intent.as_str(),
                            current.as_str(),
                            delegations,
                            classification,
                            ResumableContext {
                                history: history.clone(),
                                project_root: project_root.clone(),
                                session: session.clone(),
                            },
                        );
                        self.store.put(action).await?;

                        return Ok(SubmitOutput {
                            text: format!(
                                "{}\n\n{}",
                                challenge,
                                DelegationPromptTemplate::confirmation_hint()
                            ),
                            delegations: results,
                            session,
                            awaiting_confirmation: true,
                        });
                    }
                }
            } else if !pending_cleared {
                self.store.delete(conversation_id).await?;
                pending_cleared = true;
            }

            info!("Round {}: {} delegation(s)", round, delegations.len());
            progress.on_round_start(round as usize, delegations.len());

            let mut round_results = Vec::with_capacity(delegations.len());
            for delegation in &delegations {
                let workspace = match (project_root.as_deref(), session.as_mut()) {
                    (Some(root), Some(state)) => Some(Workspace {
                        root,
                        session: state,
                    }),
                    _ => None,
                };
                let result = self
                    .executor
                    .execute(delegation, user_prompts.as_deref(), workspace, progress)
                    .await;
                self.conversation_logger
                    .log(ConversationEvent::delegation(round, &result));
                round_results.push(result);
            }

            let code_report = match project_root.as_deref() {
                Some(root) => self.structure_report(root, &round_results).await,
                None => None,
            };
            let follow_up = build_follow_up(&round_results, code_report.as_deref());
            results.extend(round_results);

            running_history.push(Message::assistant(current.clone()));
            running_history.push(Message::user(follow_up));

            match ask_agent(
                self.gateway.as_ref(),
                self.conversation_logger.as_ref(),
                AgentRole::Coordinator,
                &running_history,
            )
            .await
            {
                Ok(answer) => {
                    if round + 1 == max_rounds && has_delegations(&answer) {
                        info!("Relance budget exhausted; returning coordinator answer as final");
                    }
                    current = answer;
                }
                Err(e) => {
                    warn!("Coordinator judgment failed: {}", e);
                    break;
                }
            }
        }

        Ok(SubmitOutput {
            text: current,
            delegations: results,
            session,
            awaiting_confirmation: false,
        })
    }

    /// Structural summary of the files the coder wrote this round.
    async fn structure_report(&self, root: &Path, results: &[DelegationResult]) -> Option<String> {
        let outcomes: Vec<_> = results
            .iter()
            .filter(|r| r.success && r.target.is_coder())
            .flat_map(|r| r.written().cloned())
            .collect();
        if outcomes.is_empty() {
            return None;
        }

        let files = self
            .executor
            .writer()
            .read_for_review(root, &outcomes, self.policy.review_max_lines);
        if files.is_empty() {
            return None;
        }

        let prompt = DelegationPromptTemplate::structure_report(&files);
        match ask_agent_prompt(
            self.gateway.as_ref(),
            self.conversation_logger.as_ref(),
            AgentRole::Reviewer,
            prompt,
        )
        .await
        {
            Ok(report) => Some(report),
            Err(e) => {
                warn!("Structure report failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryStorage, MemoryStore, RecordingLogger, ScriptedGateway};
    use conductor_domain::SafetyReason;

    const ROOT: &str = "/project";

    struct Fixture {
        gateway: ScriptedGateway,
        storage: Arc<MemoryStorage>,
        store: Arc<MemoryStore>,
    }

    impl Fixture {
        fn new(gateway: ScriptedGateway) -> Self {
            Self {
                gateway,
                storage: Arc::new(MemoryStorage::default()),
                store: Arc::new(MemoryStore::default()),
            }
        }

        fn orchestrator(&self) -> Orchestrator {
            Orchestrator::new(
                Arc::new(self.gateway.clone()),
                self.storage.clone(),
                self.store.clone(),
            )
        }
    }

    fn block(path: &str, content: &str) -> String {
        format!("# {}\n```python\n{}\n```\n", path, content)
    }

    fn project_input(intent: &str, response: &str, state: Option<ProjectState>) -> SubmitInput {
        let mut session = SessionState::project("demo", Phase::Reflexion);
        if let Some(state) = state {
            session.set_project_state(state).unwrap();
        }
        SubmitInput::new("conv-1", response)
            .with_history(vec![Message::user(intent)])
            .with_project_root(ROOT)
            .with_session(session)
    }

    #[tokio::test]
    async fn test_reply_without_directive_is_returned_as_is() {
        let fixture = Fixture::new(ScriptedGateway::default());
        let output = fixture
            .orchestrator()
            .submit(project_input("hi", "Hello! How can I help?", None))
            .await
            .unwrap();

        assert_eq!(output.text, "Hello! How can I help?");
        assert!(output.delegations.is_empty());
        assert!(!output.awaiting_confirmation);
        assert!(fixture.gateway.roles_called().is_empty());
    }

    #[tokio::test]
    async fn test_new_project_runs_and_coordinator_judges() {
        let gateway = ScriptedGateway::default()
            .reply(AgentRole::Coder, &block("calc.py", "def add(a, b):\n    return a + b"))
            .reply(AgentRole::Validator, "VALIDE")
            .reply(AgentRole::Reviewer, "## calc.py\n- Functions: add(a, b)\n- Imports: none")
            .reply(AgentRole::Coordinator, "Your calculator is ready.");
        let fixture = Fixture::new(gateway);

        let output = fixture
            .orchestrator()
            .submit(project_input(
                "build a calculator",
                "On it. [CODE_REQUEST: create calc.py with add()]",
                Some(ProjectState::New),
            ))
            .await
            .unwrap();

        assert_eq!(output.text, "Your calculator is ready.");
        assert_eq!(output.delegations.len(), 1);
        assert_eq!(output.delegations[0].written_paths(), vec!["calc.py"]);
        assert_eq!(
            output.session.as_ref().and_then(|s| s.phase()),
            Some(Phase::Execution)
        );
        assert!(fixture.storage.get("calc.py").is_some());

        let judgment = fixture.gateway.calls_to(AgentRole::Coordinator);
        let messages = &judgment[0];
        assert_eq!(messages.len(), 3);
        assert!(messages[1].content.contains("[CODE_REQUEST"));
        let follow_up = &messages[2].content;
        assert!(follow_up.contains("✅ CODER: 1 file(s)"));
        assert!(follow_up.contains("📋 Structure: 2 element(s)"));
        assert!(!follow_up.contains("Imports"));
    }

    #[tokio::test]
    async fn test_chat_mode_skips_the_gate() {
        let gateway = ScriptedGateway::default()
            .reply(AgentRole::Reviewer, "The migration plan is sound.")
            .reply(AgentRole::Coordinator, "Reviewed.");
        let fixture = Fixture::new(gateway);

        let input = SubmitInput::new("conv-1", "[BASE_VALIDATION_REQUEST: review the migration]")
            .with_history(vec![Message::user("delete the old database migration")])
            .with_session(SessionState::chat());
        let output = fixture.orchestrator().submit(input).await.unwrap();

        assert!(!output.awaiting_confirmation);
        assert_eq!(output.text, "Reviewed.");
        assert!(fixture.store.get("conv-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_non_safe_intent_pauses() {
        let fixture = Fixture::new(ScriptedGateway::default());
        let orchestrator = fixture.orchestrator();

        let output = orchestrator
            .submit(project_input(
                "refactor the database layer",
                "[CODE_REQUEST: split db.py into repo.py and models.py]",
                Some(ProjectState::Clean),
            ))
            .await
            .unwrap();

        assert!(output.awaiting_confirmation);
        assert!(output.text.contains("CLARIFICATION NEEDED"));
        assert!(output.text.contains("refactor the database layer"));
        assert!(output.text.contains("conductor confirm"));
        assert!(fixture.gateway.roles_called().is_empty());

        let pending = orchestrator.pending("conv-1").await.unwrap().unwrap();
        assert_eq!(pending.user_intent, "refactor the database layer");
        assert_eq!(pending.delegations.len(), 1);
        assert!(!pending.confirmed);
        assert_eq!(
            pending.classification.reason,
            SafetyReason::StructuralKeyword("refactor".to_string())
        );
    }

    #[tokio::test]
    async fn test_debt_project_pauses_even_simple_actions() {
        let fixture = Fixture::new(ScriptedGateway::default());
        let output = fixture
            .orchestrator()
            .submit(project_input(
                "fix typo in readme",
                "[CODE_REQUEST: fix typo]",
                Some(ProjectState::Debt),
            ))
            .await
            .unwrap();

        assert!(output.awaiting_confirmation);
        assert!(output.text.contains("VALIDATION REQUIRED"));
    }

    #[tokio::test]
    async fn test_confirm_resumes_once() {
        let gateway = ScriptedGateway::default()
            .reply(AgentRole::Coder, &block("repo.py", "class Repo: pass"))
            .reply(AgentRole::Validator, "VALIDE")
            .reply(AgentRole::Reviewer, "## repo.py\n- Classes: Repo()")
            .reply(AgentRole::Coordinator, "Refactor done.");
        let fixture = Fixture::new(gateway);
        let orchestrator = fixture.orchestrator();

        let paused = orchestrator
            .submit(project_input(
                "refactor the storage code",
                "[CODE_REQUEST: create repo.py]",
                Some(ProjectState::Clean),
            ))
            .await
            .unwrap();
        assert!(paused.awaiting_confirmation);

        let output = orchestrator.confirm("conv-1").await.unwrap();
        assert!(!output.awaiting_confirmation);
        assert_eq!(output.text, "Refactor done.");
        assert_eq!(output.delegations[0].written_paths(), vec!["repo.py"]);
        assert!(orchestrator.pending("conv-1").await.unwrap().is_none());

        let second = orchestrator.confirm("conv-1").await;
        assert!(matches!(second, Err(OrchestrationError::NothingPending(id)) if id == "conv-1"));
    }

    #[tokio::test]
    async fn test_confirmation_covers_relance_rounds() {
        let gateway = ScriptedGateway::default()
            .reply(AgentRole::Coder, &block("repo.py", "class Repo: pass"))
            .reply(AgentRole::Coder, &block("models.py", "class Model: pass"))
            .reply(AgentRole::Validator, "VALIDE")
            .reply(AgentRole::Validator, "VALIDE")
            .reply(AgentRole::Reviewer, "## repo.py")
            .reply(AgentRole::Reviewer, "## models.py")
            .reply(AgentRole::Coordinator, "[CODE_REQUEST: create models.py]")
            .reply(AgentRole::Coordinator, "Done.");
        let fixture = Fixture::new(gateway);
        let orchestrator = fixture.orchestrator();

        let paused = orchestrator
            .submit(project_input(
                "refactor the storage code",
                "[CODE_REQUEST: create repo.py]",
                Some(ProjectState::Clean),
            ))
            .await
            .unwrap();
        assert!(paused.awaiting_confirmation);

        // The relance round carries the same NON-SAFE intent and must not pause again
        let output = orchestrator.confirm("conv-1").await.unwrap();
        assert!(!output.awaiting_confirmation);
        assert_eq!(output.text, "Done.");
        assert_eq!(output.delegations.len(), 2);
        assert_eq!(output.delegations[0].written_paths(), vec!["repo.py"]);
        assert_eq!(output.delegations[1].written_paths(), vec!["models.py"]);
        assert!(fixture.storage.get("models.py").is_some());
        assert!(orchestrator.pending("conv-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_pause_and_confirm_are_logged() {
        let gateway = ScriptedGateway::default()
            .reply(AgentRole::Coder, &block("repo.py", "class Repo: pass"))
            .reply(AgentRole::Validator, "VALIDE")
            .reply(AgentRole::Reviewer, "## repo.py")
            .reply(AgentRole::Coordinator, "Done.");
        let fixture = Fixture::new(gateway);
        let logger = Arc::new(RecordingLogger::default());
        let orchestrator = fixture.orchestrator().with_conversation_logger(logger.clone());

        orchestrator
            .submit(project_input(
                "refactor the storage code",
                "[CODE_REQUEST: create repo.py]",
                Some(ProjectState::Clean),
            ))
            .await
            .unwrap();
        assert_eq!(logger.decisions(), vec!["pending"]);

        orchestrator.confirm("conv-1").await.unwrap();
        assert_eq!(
            logger.decisions(),
            vec!["pending", "pending", "pass", "verdict", "verdict", "delegation"]
        );

        let events = logger.events();
        let transitions: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                ConversationEvent::Pending {
                    conversation_id,
                    transition,
                    delegations,
                    ..
                } => Some((conversation_id.as_str(), *transition, *delegations)),
                _ => None,
            })
            .collect();
        assert_eq!(
            transitions,
            vec![
                ("conv-1", PendingTransition::Paused, 1),
                ("conv-1", PendingTransition::Confirmed, 1),
            ]
        );
        assert!(events.iter().any(|e| matches!(
            e,
            ConversationEvent::Delegation {
                round: 0,
                target: AgentRole::Coder,
                success: true,
                files_written,
                ..
            } if files_written == &vec!["repo.py".to_string()]
        )));
    }

    #[tokio::test]
    async fn test_confirm_without_pending_action() {
        let fixture = Fixture::new(ScriptedGateway::default());
        let result = fixture.orchestrator().confirm("unknown").await;
        assert!(matches!(result, Err(OrchestrationError::NothingPending(_))));
    }

    #[tokio::test]
    async fn test_cancel_removes_pending_action() {
        let fixture = Fixture::new(ScriptedGateway::default());
        let logger = Arc::new(RecordingLogger::default());
        let orchestrator = fixture.orchestrator().with_conversation_logger(logger.clone());
        orchestrator
            .submit(project_input(
                "rename the module",
                "[CODE_REQUEST: rename a.py]",
                Some(ProjectState::Clean),
            ))
            .await
            .unwrap();

        let cancelled = orchestrator.cancel("conv-1").await.unwrap();
        assert_eq!(cancelled.user_intent, "rename the module");
        assert!(matches!(
            logger.events().last(),
            Some(ConversationEvent::Pending {
                transition: PendingTransition::Cancelled,
                ..
            })
        ));
        assert!(matches!(
            orchestrator.cancel("conv-1").await,
            Err(OrchestrationError::NothingPending(_))
        ));
        assert!(matches!(
            orchestrator.confirm("conv-1").await,
            Err(OrchestrationError::NothingPending(_))
        ));
    }

    #[tokio::test]
    async fn test_relance_round() {
        let gateway = ScriptedGateway::default()
            .reply(AgentRole::Coder, &block("calc.py", "x = 1"))
            .reply(AgentRole::Validator, "VALIDE")
            .reply(AgentRole::Reviewer, "## calc.py")
            .reply(AgentRole::Coordinator, "[BASE_VALIDATION_REQUEST: check calc.py]")
            .reply(AgentRole::Reviewer, "calc.py looks right")
            .reply(AgentRole::Coordinator, "Finished.");
        let fixture = Fixture::new(gateway);

        let output = fixture
            .orchestrator()
            .submit(project_input(
                "build a calculator",
                "[CODE_REQUEST: create calc.py]",
                Some(ProjectState::New),
            ))
            .await
            .unwrap();

        assert_eq!(output.text, "Finished.");
        let targets: Vec<_> = output.delegations.iter().map(|d| d.target).collect();
        assert_eq!(targets, vec![AgentRole::Coder, AgentRole::Reviewer]);
        assert_eq!(output.delegations[1].result_text, "calc.py looks right");

        // The second judgment sees the whole running history
        let judgments = fixture.gateway.calls_to(AgentRole::Coordinator);
        assert_eq!(judgments[1].len(), 5);
    }

    #[tokio::test]
    async fn test_relance_budget_is_bounded() {
        let gateway = ScriptedGateway::default()
            .reply(AgentRole::Reviewer, "first")
            .reply(AgentRole::Coordinator, "[BASE_VALIDATION_REQUEST: again]");
        let fixture = Fixture::new(gateway);

        let output = fixture
            .orchestrator()
            .with_policy(OrchestrationPolicy::default().with_max_relances(0))
            .submit(
                SubmitInput::new("conv-1", "[BASE_VALIDATION_REQUEST: look]")
                    .with_history(vec![Message::user("look at it")]),
            )
            .await
            .unwrap();

        assert_eq!(output.text, "[BASE_VALIDATION_REQUEST: again]");
        assert_eq!(output.delegations.len(), 1);
    }

    #[tokio::test]
    async fn test_coordinator_failure_keeps_results() {
        let gateway = ScriptedGateway::default()
            .reply(AgentRole::Reviewer, "checked")
            .fail(AgentRole::Coordinator, "503");
        let fixture = Fixture::new(gateway);

        let response = "Let me check. [BASE_VALIDATION_REQUEST: check it]";
        let output = fixture
            .orchestrator()
            .submit(SubmitInput::new("conv-1", response))
            .await
            .unwrap();

        assert_eq!(output.text, response);
        assert_eq!(output.delegations.len(), 1);
        assert!(output.delegations[0].success);
    }

    #[tokio::test]
    async fn test_duplicate_targets_run_once() {
        let gateway = ScriptedGateway::default()
            .reply(AgentRole::Coder, "first")
            .reply(AgentRole::Coder, "second")
            .reply(AgentRole::Coordinator, "ok");
        let fixture = Fixture::new(gateway);

        let output = fixture
            .orchestrator()
            .submit(SubmitInput::new(
                "conv-1",
                "[CODE_REQUEST: one] and [CODE_REQUEST: two]",
            ))
            .await
            .unwrap();

        assert_eq!(output.delegations.len(), 1);
        assert_eq!(output.delegations[0].instruction, "one");
        assert_eq!(fixture.gateway.remaining(AgentRole::Coder), 1);
    }

    #[tokio::test]
    async fn test_failed_specialist_is_reported_to_coordinator() {
        let gateway = ScriptedGateway::default()
            .fail(AgentRole::Validator, "model unavailable")
            .reply(AgentRole::Coordinator, "The validator is down.");
        let fixture = Fixture::new(gateway);

        let output = fixture
            .orchestrator()
            .submit(SubmitInput::new("conv-1", "[STRICT_VALIDATION_REQUEST: audit]"))
            .await
            .unwrap();

        assert!(!output.delegations[0].success);
        let follow_up = &fixture.gateway.calls_to(AgentRole::Coordinator)[0][1].content;
        assert!(follow_up.contains("CRITICAL ERRORS DETECTED"));
        assert!(follow_up.contains("❌ VALIDATOR failed"));
    }
}
