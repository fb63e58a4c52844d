//! Console output for conductor results

use colored::Colorize;
use conductor_application::{OrchestrationProgress, SubmitOutput};
use conductor_domain::{
    AgentRole, Classification, Delegation, DelegationResult, FileWriteOutcome, PendingAction,
    WriteStatus,
};
use serde::Serialize;
use serde_json::json;

/// Formats command results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the outcome of `submit` or `confirm`
    pub fn format_submit(output: &SubmitOutput) -> String {
        let mut out = String::new();

        if output.awaiting_confirmation {
            out.push_str(&Self::header("Confirmation required"));
            out.push_str(&format!("\n{}\n", output.text));
            return out;
        }

        out.push_str(&Self::header("Orchestration Results"));

        if let Some(session) = &output.session {
            let phase = session
                .phase()
                .map(|p| format!(" / {}", p))
                .unwrap_or_default();
            out.push_str(&format!(
                "{} {}{}\n",
                "Session:".cyan().bold(),
                session.mode(),
                phase
            ));
        }

        if !output.delegations.is_empty() {
            out.push_str(&format!(
                "\n{} {}\n",
                "Delegations:".cyan().bold(),
                output.delegations.len()
            ));
            for result in &output.delegations {
                out.push_str(&Self::delegation(result));
            }
        }

        out.push_str(&format!("\n{}\n{}\n", "Reply:".cyan().bold(), output.text));
        out
    }

    fn delegation(result: &DelegationResult) -> String {
        let mark = if result.success {
            "v".green()
        } else {
            "x".red()
        };
        let mut out = format!(
            "\n  {} {} {}\n",
            mark,
            format!("[{}]", result.target.label()).yellow().bold(),
            result.instruction
        );

        if let Some(error) = &result.error {
            out.push_str(&format!("    {} {}\n", "Error:".red(), error));
        }
        if result.target.is_coder() {
            out.push_str(&format!(
                "    passes: {}{}\n",
                result.passes_used,
                if result.stagnation {
                    format!(" ({})", "stagnation".yellow())
                } else {
                    String::new()
                }
            ));
        }
        for outcome in &result.files_written {
            out.push_str(&format!("    {}\n", Self::outcome(outcome)));
        }
        if let Some(report) = &result.validation_report {
            out.push_str(&format!(
                "    {} {}\n",
                "Validation:".cyan(),
                report.lines().next().unwrap_or_default()
            ));
        }
        out
    }

    fn outcome(outcome: &FileWriteOutcome) -> String {
        let status = match outcome.status {
            WriteStatus::Written => outcome.status.as_str().green(),
            WriteStatus::Blocked => outcome.status.as_str().yellow(),
            WriteStatus::Rejected | WriteStatus::Error => outcome.status.as_str().red(),
        };
        match (&outcome.bytes, &outcome.error) {
            (Some(bytes), _) => format!("{:<8} {} ({} bytes)", status, outcome.path, bytes),
            (None, Some(error)) => format!("{:<8} {}: {}", status, outcome.path, error),
            (None, None) => format!("{:<8} {}", status, outcome.path),
        }
    }

    /// Format a safety classification, with the challenge for NON-SAFE intents
    pub fn format_classification(classification: &Classification, challenge: Option<&str>) -> String {
        let verdict = if classification.is_safe {
            "SAFE".green().bold()
        } else {
            "NON-SAFE".red().bold()
        };
        let mut out = format!(
            "{} {}\n{} {}\n",
            "Classification:".cyan().bold(),
            verdict,
            "Reason:".cyan().bold(),
            classification.reason
        );
        if let Some(challenge) = challenge {
            out.push_str(&format!("\n{}\n", challenge));
        }
        out
    }

    /// Format a cancelled action
    pub fn format_cancelled(action: &PendingAction) -> String {
        format!(
            "{} pending action for '{}' ({} delegation(s)): {}\n",
            "Cancelled".yellow().bold(),
            action.conversation_id,
            action.delegations.len(),
            action.user_intent
        )
    }

    /// Pretty-printed JSON for any serializable result
    pub fn format_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    /// JSON document for `classify`
    pub fn format_classification_json(
        classification: &Classification,
        challenge: Option<&str>,
    ) -> String {
        Self::format_json(&json!({
            "classification": classification,
            "challenge": challenge,
        }))
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!(
            "\n{}\n{}\n{}\n",
            line.cyan(),
            format!("  {}", title).cyan().bold(),
            line.cyan()
        )
    }
}

/// Simple text progress written to stderr
pub struct ProgressReporter;

impl OrchestrationProgress for ProgressReporter {
    fn on_round_start(&self, round: usize, delegations: usize) {
        let label = if round == 0 {
            "Initial reply".to_string()
        } else {
            format!("Relance {}", round)
        };
        eprintln!(
            "{} {} ({} delegation(s))",
            "->".cyan(),
            label.bold(),
            delegations
        );
    }

    fn on_delegation_start(&self, delegation: &Delegation) {
        eprintln!(
            "  {} {}",
            format!("[{}]", delegation.target.label()).yellow(),
            conductor_domain::core::string::preview(&delegation.instruction, 80)
        );
    }

    fn on_pass(&self, role: AgentRole, pass: u32, max_passes: u32) {
        eprintln!("    {} pass {}/{}", role, pass, max_passes);
    }

    fn on_files_written(&self, outcomes: &[FileWriteOutcome]) {
        for outcome in outcomes {
            eprintln!("    {}", ConsoleFormatter::outcome(outcome));
        }
    }

    fn on_stagnation(&self, role: AgentRole, pass: u32) {
        eprintln!(
            "    {} {} stopped producing files at pass {}",
            "!".yellow(),
            role,
            pass
        );
    }

    fn on_delegation_complete(&self, result: &DelegationResult) {
        if result.success {
            eprintln!("  {} {}", "v".green(), result.target.label());
        } else {
            eprintln!("  {} {} (failed)", "x".red(), result.target.label());
        }
    }

    fn on_safety_pause(&self, classification: &Classification) {
        eprintln!("{} {}", "Paused:".yellow().bold(), classification.reason);
    }
}
