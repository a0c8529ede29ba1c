//! CLI command definitions and dispatch for the `chronicle` binary.
//!
//! Uses clap derive macros for argument parsing. The CLI follows a
//! verb-noun pattern (e.g., `chronicle repo add`, `chronicle milestone
//! list`).

pub mod activity;
pub mod config_cmd;
pub mod format;
pub mod milestone;
pub mod provider_cmd;
pub mod record;
pub mod repo;
pub mod session;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use uuid::Uuid;

/// Track your development sessions across AI tools and git commits.
#[derive(Parser)]
#[command(name = "chronicle", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the data directory, config, and database.
    Init,

    /// Manage tracked git repositories.
    Repo {
        #[command(subcommand)]
        action: RepoCommand,
    },

    /// Show commit activity for a period.
    Show {
        #[arg(value_enum)]
        period: PeriodArg,

        /// Filter by repository path.
        #[arg(long)]
        repo: Option<String>,
    },

    /// Show AI-tool sessions for a period.
    Ai {
        #[arg(value_enum)]
        period: PeriodArg,

        /// Filter by tool name (claude, gemini, ...).
        #[arg(long)]
        tool: Option<String>,
    },

    /// Show the combined commit + session timeline for a period.
    Timeline {
        #[arg(value_enum)]
        period: PeriodArg,

        /// Filter by repository path.
        #[arg(long)]
        repo: Option<String>,
    },

    /// Search commits and sessions by content.
    Search {
        /// Term to look for in commit messages and session summaries.
        term: String,

        /// Maximum results per table.
        #[arg(long, default_value = "20")]
        limit: i64,
    },

    /// AI-tool usage statistics.
    Stats {
        /// Days to look back.
        #[arg(long, default_value = "30")]
        days: i64,
    },

    /// List recent recorded sessions.
    Sessions {
        /// Maximum sessions to list.
        #[arg(long, default_value = "10")]
        limit: i64,
    },

    /// Show one session in detail.
    Session {
        /// Session id.
        id: Uuid,
    },

    /// Record an interactive tool session.
    Record {
        /// Tool to launch (claude, gemini, vim, ...).
        tool: String,

        /// Custom command to run instead of the tool name.
        #[arg(long)]
        command: Option<String>,
    },

    /// Generate (or resume) the summary for a session.
    Summarize {
        /// Session id.
        id: Uuid,

        /// Discard existing checkpoints and redo every chunk.
        #[arg(long)]
        force: bool,
    },

    /// Generate a one-paragraph digest of today's activity.
    Digest,

    /// Manage project milestones.
    Milestone {
        #[command(subcommand)]
        action: MilestoneCommand,
    },

    /// Manage next-step TODO items.
    Next {
        #[command(subcommand)]
        action: NextCommand,
    },

    /// Get or set configuration values.
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },

    /// Test the configured generation provider.
    Provider {
        #[command(subcommand)]
        action: ProviderCommand,
    },

    /// Show today's per-model quota usage.
    Quota,

    /// Start the read-only HTTP query API.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "4700")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum PeriodArg {
    Today,
    Yesterday,
    Week,
}

impl From<PeriodArg> for chronicle_core::service::Period {
    fn from(arg: PeriodArg) -> Self {
        match arg {
            PeriodArg::Today => chronicle_core::service::Period::Today,
            PeriodArg::Yesterday => chronicle_core::service::Period::Yesterday,
            PeriodArg::Week => chronicle_core::service::Period::Week,
        }
    }
}

#[derive(Subcommand)]
pub enum RepoCommand {
    /// Track a repository and import its recent commits.
    Add {
        /// Path to the git repository.
        path: String,

        /// Number of recent commits to import.
        #[arg(long, default_value = "50")]
        limit: usize,
    },

    /// Re-scan tracked repositories (or one path) for new commits.
    Sync {
        /// Repository path; defaults to every tracked repository.
        path: Option<String>,

        /// Number of recent commits to scan.
        #[arg(long, default_value = "50")]
        limit: usize,
    },

    /// Show statistics for a repository.
    Stats {
        /// Path to the git repository.
        path: String,
    },
}

#[derive(Subcommand)]
pub enum MilestoneCommand {
    /// Add a milestone.
    Add {
        /// Milestone title.
        title: String,

        /// Kind of work: feature, bugfix, optimization, docs.
        #[arg(long, default_value = "feature")]
        kind: String,

        /// Priority 1 (highest) to 5 (lowest).
        #[arg(long, default_value = "3")]
        priority: u8,

        /// Longer description.
        #[arg(long)]
        description: Option<String>,

        /// Comma-separated tags.
        #[arg(long)]
        tags: Option<String>,
    },

    /// List milestones.
    List {
        /// Filter by status: planned, in_progress, completed, archived.
        #[arg(long)]
        status: Option<String>,
    },

    /// Mark a milestone completed.
    Done {
        /// Milestone id.
        id: Uuid,
    },
}

#[derive(Subcommand)]
pub enum NextCommand {
    /// Add a next step.
    Add {
        /// What needs doing.
        description: String,

        /// Priority 1 (highest) to 5 (lowest).
        #[arg(long, default_value = "3")]
        priority: u8,

        /// Category: feature, optimization, fix, docs.
        #[arg(long, default_value = "feature")]
        category: String,

        /// Milestone to attach the step to.
        #[arg(long)]
        milestone: Option<Uuid>,
    },

    /// List next steps.
    List {
        /// Include completed steps.
        #[arg(long)]
        all: bool,
    },

    /// Mark a step completed.
    Done {
        /// Step id.
        id: Uuid,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print one config value.
    Get {
        /// Dotted key, e.g. `summarizer.max_retries`.
        key: String,
    },

    /// Set one config value.
    Set {
        /// Dotted key, e.g. `provider`.
        key: String,

        /// New value.
        value: String,
    },

    /// Print the whole config.
    List,
}

#[derive(Subcommand)]
pub enum ProviderCommand {
    /// Send a tiny prompt through the configured provider.
    Test,
}
