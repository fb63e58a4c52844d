//! CLI command definitions

use clap::{Args, Parser, Subcommand};
use conductor_domain::{Phase, ProjectState};
use std::path::PathBuf;

/// CLI arguments for conductor
#[derive(Parser, Debug)]
#[command(name = "conductor")]
#[command(author, version, about = "Delegation orchestrator for a team of coding agents")]
#[command(long_about = r#"
Conductor takes a coordinator agent's reply, runs the delegation directives
it contains ([CODE_REQUEST: ...], [BASE_VALIDATION_REQUEST: ...],
[STRICT_VALIDATION_REQUEST: ...]) against specialist agents, writes the
files the coder produces and feeds the results back to the coordinator.

In project mode every batch of directives first goes through a safety gate.
A NON-SAFE intent pauses the run until `conductor confirm` (or `cancel`).

Configuration files are loaded from (in priority order):
1. CONDUCTOR_* environment variables
2. --config <path>     Explicit config file
3. ./conductor.toml    Project-level config
4. ~/.config/conductor/config.toml   Global config

Example:
  conductor submit --conversation c1 --response reply.md --script agents.toml \
      --root ./demo --project demo --phase execution --project-state new
  conductor confirm --conversation c1 --script agents.toml
  conductor classify "rename the api module" --project-state clean
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Directory holding paused actions (overrides storage.pending_dir)
    #[arg(long, value_name = "DIR", global = true)]
    pub pending_dir: Option<PathBuf>,

    /// Also write diagnostics to this file
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Process a coordinator reply
    Submit(SubmitArgs),

    /// Resume the action paused for a conversation
    Confirm {
        #[command(flatten)]
        conversation: ConversationArg,

        /// TOML file of canned agent replies
        #[arg(long, value_name = "FILE")]
        script: PathBuf,
    },

    /// Drop the action paused for a conversation
    Cancel {
        #[command(flatten)]
        conversation: ConversationArg,
    },

    /// Classify a user intent with the safety gate
    Classify {
        /// The user's request
        intent: String,

        /// State of the analyzed project
        #[arg(long, value_name = "STATE", default_value = "clean")]
        project_state: ProjectState,

        /// Phase of the project session
        #[arg(long, value_name = "PHASE", default_value = "execution")]
        phase: Phase,
    },

    /// Show configuration file locations
    Config,
}

#[derive(Args, Debug)]
pub struct ConversationArg {
    /// Conversation identifier
    #[arg(long = "conversation", value_name = "ID")]
    pub id: String,
}

#[derive(Args, Debug)]
pub struct SubmitArgs {
    #[command(flatten)]
    pub conversation: ConversationArg,

    /// File holding the coordinator reply (`-` reads stdin)
    #[arg(long, value_name = "FILE")]
    pub response: PathBuf,

    /// JSON array of prior messages ({"role": "user", "content": "..."})
    #[arg(long, value_name = "FILE")]
    pub history: Option<PathBuf>,

    /// Project root files are written under
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Project identifier; enables project mode
    #[arg(long, value_name = "ID")]
    pub project: Option<String>,

    /// Phase of the project session
    #[arg(long, value_name = "PHASE", requires = "project")]
    pub phase: Option<Phase>,

    /// State of the analyzed project
    #[arg(long, value_name = "STATE", requires = "project")]
    pub project_state: Option<ProjectState>,

    /// TOML file of canned agent replies
    #[arg(long, value_name = "FILE")]
    pub script: PathBuf,
}
