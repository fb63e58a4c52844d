//! CLI entrypoint for conductor
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod commands;
mod output;

use anyhow::{Context, Result, bail};
use clap::Parser;
use commands::{Cli, Command, SubmitArgs};
use conductor_application::{
    ConversationLogger, NoProgress, OrchestrationProgress, Orchestrator, SubmitInput,
};
use conductor_domain::{Message, OutputFormat, SafetyClassifier, SessionState, generate_challenge};
use conductor_infrastructure::{
    ConfigLoader, FileConfig, JsonFilePendingActionStore, JsonlConversationLogger,
    LocalProjectStorage, ScriptedAgentGateway,
};
use output::{ConsoleFormatter, ProgressReporter};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so the file writer flushes on exit
    let _log_guard = init_tracing(cli.verbose, cli.log_file.as_deref())?;

    info!("Starting conductor");

    // === Load Configuration ===
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("Failed to load configuration")?
    };

    let issues = config.validate();
    for issue in &issues {
        warn!("config {}", issue);
    }
    if FileConfig::has_errors(&issues) {
        bail!(
            "Invalid configuration: {}",
            issues
                .iter()
                .filter(|i| i.is_error())
                .map(|i| i.message.as_str())
                .collect::<Vec<_>>()
                .join("; ")
        );
    }

    if !config.output.color {
        colored::control::set_override(false);
    }
    let format = if cli.json {
        OutputFormat::Json
    } else {
        config.output.format.unwrap_or_default()
    };

    match &cli.command {
        Command::Submit(args) => {
            let orchestrator = build_orchestrator(&cli, &config, Some(args.script.as_path()))?;
            let input = submit_input(args)?;
            let output = orchestrator
                .submit_with_progress(input, progress_for(format))
                .await?;
            print_result(format, &output, ConsoleFormatter::format_submit);
        }
        Command::Confirm {
            conversation,
            script,
        } => {
            let orchestrator = build_orchestrator(&cli, &config, Some(script.as_path()))?;
            let output = orchestrator
                .confirm_with_progress(&conversation.id, progress_for(format))
                .await?;
            print_result(format, &output, ConsoleFormatter::format_submit);
        }
        Command::Cancel { conversation } => {
            let orchestrator = build_orchestrator(&cli, &config, None)?;
            let action = orchestrator.cancel(&conversation.id).await?;
            print_result(format, &action, ConsoleFormatter::format_cancelled);
        }
        Command::Classify {
            intent,
            project_state,
            phase,
        } => {
            let classifier = SafetyClassifier::new(config.safety.to_rules());
            let classification = classifier.classify(intent, *project_state, *phase);
            let challenge = (!classification.is_safe)
                .then(|| generate_challenge(intent, &classification, Some(*project_state)));

            match format {
                OutputFormat::Json => println!(
                    "{}",
                    ConsoleFormatter::format_classification_json(
                        &classification,
                        challenge.as_deref()
                    )
                ),
                OutputFormat::Text => print!(
                    "{}",
                    ConsoleFormatter::format_classification(&classification, challenge.as_deref())
                ),
            }
        }
        Command::Config => {
            ConfigLoader::print_config_sources();
        }
    }

    Ok(())
}

/// Install the tracing subscriber
///
/// `RUST_LOG` wins over `-v` when set. With `--log-file`, events are also
/// written (without colors) through a non-blocking appender.
fn init_tracing(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file_name = path
                .file_name()
                .with_context(|| format!("--log-file needs a file name: {}", path.display()))?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Wire the adapters into an orchestrator
///
/// `cancel` never reaches an agent, so it runs with an empty gateway.
fn build_orchestrator(cli: &Cli, config: &FileConfig, script: Option<&Path>) -> Result<Orchestrator> {
    // === Dependency Injection ===
    let gateway = match script {
        Some(path) => ScriptedAgentGateway::from_file(path)?,
        None => ScriptedAgentGateway::default(),
    };

    let pending_dir = cli
        .pending_dir
        .clone()
        .or_else(|| config.storage.pending_dir.clone())
        .or_else(ConfigLoader::default_pending_dir)
        .context("No directory for pending actions; pass --pending-dir")?;
    info!("Pending actions in {}", pending_dir.display());

    let mut orchestrator = Orchestrator::new(
        Arc::new(gateway),
        Arc::new(LocalProjectStorage::new()),
        Arc::new(JsonFilePendingActionStore::new(pending_dir)),
    )
    .with_policy(config.orchestration.clone())
    .with_safety_rules(config.safety.to_rules());

    if let Some(path) = &config.logging.conversation_log {
        match JsonlConversationLogger::new(path) {
            Some(logger) => {
                info!("Conversation log: {}", logger.path().display());
                let logger: Arc<dyn ConversationLogger> = Arc::new(logger);
                orchestrator = orchestrator.with_conversation_logger(logger);
            }
            None => warn!("Conversation logging disabled"),
        }
    }

    Ok(orchestrator)
}

fn submit_input(args: &SubmitArgs) -> Result<SubmitInput> {
    let response = read_source(&args.response)?;
    let mut input = SubmitInput::new(args.conversation.id.clone(), response);

    if let Some(path) = &args.history {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read history {}", path.display()))?;
        let history: Vec<Message> = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid history {}", path.display()))?;
        input = input.with_history(history);
    }

    if let Some(root) = &args.root {
        input = input.with_project_root(root.clone());
    }

    if let Some(project) = &args.project {
        let phase = args.phase.unwrap_or(conductor_domain::Phase::Reflexion);
        let mut session = SessionState::project(project.clone(), phase);
        if let Some(state) = args.project_state {
            session = session.with_project_state(state)?;
        }
        input = input.with_session(session);
    } else if args.root.is_some() {
        input = input.with_session(SessionState::chat());
    }

    Ok(input)
}

/// Read a file, or stdin for `-`
fn read_source(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Could not read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("Could not read {}", path.display()))
}

fn progress_for(format: OutputFormat) -> &'static dyn OrchestrationProgress {
    match format {
        OutputFormat::Text => &ProgressReporter,
        OutputFormat::Json => &NoProgress,
    }
}

fn print_result<T: serde::Serialize>(format: OutputFormat, value: &T, text: fn(&T) -> String) {
    match format {
        OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(value)),
        OutputFormat::Text => print!("{}", text(value)),
    }
}
