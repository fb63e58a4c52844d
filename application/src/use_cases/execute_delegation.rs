//! Execute Delegation use case
//!
//! Runs one delegation end to end. Non-code targets answer once. A code
//! delegation with a workspace goes through a bounded loop:
//!
//! ```text
//! pass 1      coder reply → extract → write
//! pass 2..N   verify → (complete? stop) → completion request → extract → write
//!             two consecutive passes without a new file → stop (stagnation)
//! validation  validator reads the written files
//!             INVALIDE and passes left → one correction round
//! ```

use crate::config::OrchestrationPolicy;
use crate::ports::agent_gateway::{AgentGateway, GatewayError};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger, VerdictCheck,
};
use crate::ports::progress::OrchestrationProgress;
use crate::ports::project_storage::ProjectStorage;
use crate::use_cases::shared::ask_agent_prompt;
use crate::use_cases::verify_completeness::CompletenessVerifier;
use crate::use_cases::write_files::FileWriter;
use conductor_domain::core::string::truncate;
use conductor_domain::files::extractor::diagnostic_preview;
use conductor_domain::{
    AgentRole, CompletenessVerdict, Delegation, DelegationPromptTemplate, DelegationResult,
    FileWriteOutcome, Phase, SessionState, expected_files, extract_files, is_invalid,
    near_misses,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Where a code delegation may write: the project root and the session
/// state that gates the writes.
pub struct Workspace<'a> {
    pub root: &'a Path,
    pub session: &'a mut SessionState,
}

/// Files produced so far by one delegation.
#[derive(Default)]
struct Produced {
    outcomes: Vec<FileWriteOutcome>,
    paths: Vec<String>,
}

impl Produced {
    /// Record a batch and return how many written paths are new.
    fn record(&mut self, batch: Vec<FileWriteOutcome>) -> usize {
        let mut new_files = 0;
        for outcome in &batch {
            if outcome.is_written() && !self.paths.contains(&outcome.path) {
                self.paths.push(outcome.path.clone());
                new_files += 1;
            }
        }
        self.outcomes.extend(batch);
        new_files
    }
}

#[derive(Clone)]
pub struct DelegationExecutor {
    gateway: Arc<dyn AgentGateway>,
    writer: FileWriter,
    verifier: CompletenessVerifier,
    policy: OrchestrationPolicy,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl DelegationExecutor {
    pub fn new(gateway: Arc<dyn AgentGateway>, storage: Arc<dyn ProjectStorage>) -> Self {
        Self {
            verifier: CompletenessVerifier::new(gateway.clone()),
            writer: FileWriter::new(storage),
            gateway,
            policy: OrchestrationPolicy::default(),
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_policy(mut self, policy: OrchestrationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.verifier = self.verifier.with_conversation_logger(logger.clone());
        self.conversation_logger = logger;
        self
    }

    pub fn writer(&self) -> &FileWriter {
        &self.writer
    }

    /// Run `delegation`.
    ///
    /// `user_prompts` are the user's messages, prepended to the instruction
    /// when checking completeness. Agent failures become a failed result;
    /// nothing here returns an error.
    pub async fn execute(
        &self,
        delegation: &Delegation,
        user_prompts: Option<&str>,
        workspace: Option<Workspace<'_>>,
        progress: &dyn OrchestrationProgress,
    ) -> DelegationResult {
        progress.on_delegation_start(delegation);
        info!(
            "Delegating to {}: {}",
            delegation.target,
            truncate(&delegation.instruction, 100)
        );

        let result = match self.ask(delegation.target, delegation.instruction.clone()).await {
            Err(e) => {
                warn!("{} could not respond: {}", delegation.target, e);
                DelegationResult::failed(delegation, e.to_string())
            }
            Ok(reply) => match workspace {
                Some(workspace) if delegation.target.is_coder() => {
                    self.run_code_loop(delegation, reply, user_prompts, workspace, progress)
                        .await
                }
                _ => DelegationResult::succeeded(delegation, reply),
            },
        };

        progress.on_delegation_complete(&result);
        result
    }

    async fn run_code_loop(
        &self,
        delegation: &Delegation,
        reply: String,
        user_prompts: Option<&str>,
        workspace: Workspace<'_>,
        progress: &dyn OrchestrationProgress,
    ) -> DelegationResult {
        let Workspace { root, session } = workspace;
        let role = delegation.target;

        if session.phase() == Some(Phase::Reflexion) {
            match session.transition_to_execution() {
                Ok(()) => info!("Session switched to EXECUTION for {}", role),
                Err(e) => warn!("Could not switch session to EXECUTION: {}", e),
            }
        }

        let expectation = match user_prompts {
            Some(prompts) => format!("{}\n\n{}", prompts, delegation.instruction),
            None => delegation.instruction.clone(),
        };
        let max_passes = self
            .policy
            .max_passes_for(expected_files(&delegation.instruction).len());

        let mut result = DelegationResult::succeeded(delegation, reply);
        let mut produced = Produced::default();

        progress.on_pass(role, 1, max_passes);
        let batch = self.write_reply(root, session, role, &result.result_text, progress);
        let new_files = produced.record(batch);
        self.log_pass(role, 1, max_passes, new_files);

        if !session.can_write_disk() {
            result.files_written = produced.outcomes;
            return result;
        }

        let mut passes_used = 1;
        let mut empty_passes = 0;
        for pass in 2..=max_passes {
            let verdict = self.verifier.verify(&expectation, &produced.paths).await;
            self.conversation_logger.log(ConversationEvent::Verdict {
                check: VerdictCheck::Completeness,
                pass,
                passed: verdict.is_complete(),
                detail: match &verdict {
                    CompletenessVerdict::Complete => None,
                    CompletenessVerdict::Incomplete { missing } => Some(missing.clone()),
                },
            });
            let missing = match verdict {
                CompletenessVerdict::Complete => {
                    info!("{}: complete after {} pass(es)", role, passes_used);
                    break;
                }
                CompletenessVerdict::Incomplete { missing } => missing,
            };

            progress.on_pass(role, pass, max_passes);
            let prompt = DelegationPromptTemplate::completion(&delegation.instruction, &missing);
            let continuation = match self.ask(role, prompt).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("Completion request failed at pass {}: {}", pass, e);
                    break;
                }
            };
            passes_used = pass;

            let batch = self.write_reply(root, session, role, &continuation, progress);
            append_reply(&mut result.result_text, &continuation);

            let new_files = produced.record(batch);
            self.log_pass(role, pass, max_passes, new_files);
            if new_files == 0 {
                empty_passes += 1;
                if empty_passes > self.policy.stagnation_tolerance {
                    warn!("{}: no new file for {} passes, stopping", role, empty_passes);
                    result.stagnation = true;
                    progress.on_stagnation(role, pass);
                    break;
                }
            } else {
                empty_passes = 0;
            }
        }

        if !produced.paths.is_empty() {
            let review = self
                .writer
                .read_for_review(root, &produced.outcomes, self.policy.review_max_lines);
            if !review.is_empty() {
                result.validation_report = self.validate(&review).await;
            }
        }
        if let Some(report) = &result.validation_report {
            self.conversation_logger.log(ConversationEvent::Verdict {
                check: VerdictCheck::Validation,
                pass: passes_used,
                passed: !is_invalid(report),
                detail: Some(report.clone()),
            });
        }

        let invalid_report = result.validation_report.clone().filter(|r| is_invalid(r));
        if let Some(report) = invalid_report {
            if passes_used < max_passes {
                passes_used += 1;
                progress.on_pass(role, passes_used, max_passes);
                let prompt = DelegationPromptTemplate::correction(&report, &delegation.instruction);
                match self.ask(role, prompt).await {
                    Ok(correction) => {
                        let batch = self.write_reply(root, session, role, &correction, progress);
                        let new_files = produced.record(batch);
                        self.log_pass(role, passes_used, max_passes, new_files);
                        append_reply(&mut result.result_text, &correction);
                    }
                    Err(e) => warn!("Correction request failed: {}", e),
                }
            } else {
                info!("Validation failed but no pass left ({}/{})", passes_used, max_passes);
            }
        }

        result.files_written = produced.outcomes;
        result.passes_used = passes_used;
        result
    }

    async fn validate(&self, files: &[(String, String)]) -> Option<String> {
        let prompt = DelegationPromptTemplate::validation(files);
        match self.ask(AgentRole::Validator, prompt).await {
            Ok(report) => {
                info!(
                    "Validation of {} file(s): {}",
                    files.len(),
                    if is_invalid(&report) { "problems found" } else { "ok" }
                );
                Some(report)
            }
            Err(e) => {
                warn!("Quality validation failed: {}", e);
                None
            }
        }
    }

    fn write_reply(
        &self,
        root: &Path,
        session: &SessionState,
        role: AgentRole,
        reply: &str,
        progress: &dyn OrchestrationProgress,
    ) -> Vec<FileWriteOutcome> {
        let files = extract_files(reply);
        if files.is_empty() {
            report_empty_extraction(role, reply);
            return Vec::new();
        }
        let outcomes = self.writer.write(root, &files, session);
        progress.on_files_written(&outcomes);
        outcomes
    }

    fn log_pass(&self, role: AgentRole, pass: u32, max_passes: u32, new_files: usize) {
        self.conversation_logger.log(ConversationEvent::Pass {
            role,
            pass,
            max_passes,
            new_files,
        });
    }

    async fn ask(&self, role: AgentRole, prompt: String) -> Result<String, GatewayError> {
        ask_agent_prompt(
            self.gateway.as_ref(),
            self.conversation_logger.as_ref(),
            role,
            prompt,
        )
        .await
    }
}

fn append_reply(text: &mut String, reply: &str) {
    text.push_str("\n\n");
    text.push_str(reply);
}

fn report_empty_extraction(role: AgentRole, reply: &str) {
    warn!("{} reply has no annotated code block ({} chars)", role, reply.len());
    for miss in near_misses(reply) {
        warn!(
            "  near miss: {} ({})",
            miss.shape.description(),
            miss.samples.join(", ")
        );
    }
    warn!("  reply starts with: {}", diagnostic_preview(reply));
}
