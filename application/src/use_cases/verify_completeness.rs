//! Completeness verification use case.
//!
//! Decides whether a code delegation produced every requested file. A local
//! count over the expected-file heuristics is tried first; only when the
//! instruction names no recognizable file is the reviewer asked. A failing
//! reviewer call counts as complete, so a broken verifier never traps a
//! delegation in its loop.

use crate::ports::agent_gateway::AgentGateway;
use crate::ports::conversation_logger::{ConversationLogger, NoConversationLogger};
use crate::use_cases::shared::ask_agent_prompt;
use conductor_domain::core::string::truncate;
use conductor_domain::{
    AgentRole, CompletenessVerdict, DelegationPromptTemplate, expected_files, missing_files,
};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct CompletenessVerifier {
    gateway: Arc<dyn AgentGateway>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl CompletenessVerifier {
    pub fn new(gateway: Arc<dyn AgentGateway>) -> Self {
        Self {
            gateway,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    /// Compare the files `instruction` asks for with the paths written so far.
    pub async fn verify(&self, instruction: &str, written: &[String]) -> CompletenessVerdict {
        let expected = expected_files(instruction);

        if !expected.is_empty() {
            let missing = missing_files(&expected, written);
            info!(
                "Local count: {}/{} expected file(s) present{}",
                expected.len() - missing.len(),
                expected.len(),
                if missing.is_empty() {
                    String::new()
                } else {
                    format!(", missing: {}", missing.join(", "))
                }
            );
            return CompletenessVerdict::from_missing(&missing);
        }

        let prompt = DelegationPromptTemplate::verification(instruction, written);
        match ask_agent_prompt(
            self.gateway.as_ref(),
            self.conversation_logger.as_ref(),
            AgentRole::Reviewer,
            prompt,
        )
        .await
        {
            Ok(reply) => {
                info!("Reviewer verification: {}", truncate(&reply, 100));
                CompletenessVerdict::parse(&reply)
            }
            Err(e) => {
                warn!("Reviewer verification failed, assuming complete: {}", e);
                CompletenessVerdict::Complete
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedGateway;

    fn paths(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_local_count_skips_reviewer() {
        let gateway = ScriptedGateway::default();
        let verifier = CompletenessVerifier::new(Arc::new(gateway.clone()));

        let verdict = verifier
            .verify("create src/a.py and src/b.py", &paths(&["src/a.py"]))
            .await;
        assert_eq!(
            verdict,
            CompletenessVerdict::Incomplete {
                missing: "INCOMPLET: src/b.py".to_string()
            }
        );

        let verdict = verifier
            .verify("create src/a.py and src/b.py", &paths(&["src/a.py", "b.py"]))
            .await;
        assert!(verdict.is_complete());
        assert!(gateway.roles_called().is_empty());
    }

    #[tokio::test]
    async fn test_reviewer_fallback() {
        let gateway = ScriptedGateway::default()
            .reply(AgentRole::Reviewer, "INCOMPLET: the tests")
            .reply(AgentRole::Reviewer, "All good: COMPLET");
        let verifier = CompletenessVerifier::new(Arc::new(gateway.clone()));

        let first = verifier.verify("write the app", &[]).await;
        assert_eq!(
            first,
            CompletenessVerdict::Incomplete {
                missing: "INCOMPLET: the tests".to_string()
            }
        );
        assert!(verifier.verify("write the app", &[]).await.is_complete());

        let calls = gateway.calls_to(AgentRole::Reviewer);
        assert_eq!(calls.len(), 2);
        assert!(calls[0][0].content.contains("write the app"));
    }

    #[tokio::test]
    async fn test_reviewer_failure_fails_open() {
        let gateway = ScriptedGateway::default().fail(AgentRole::Reviewer, "down");
        let verifier = CompletenessVerifier::new(Arc::new(gateway));
        assert!(verifier.verify("write the app", &[]).await.is_complete());
    }
}
