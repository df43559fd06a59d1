use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xata-provider")]
#[command(version)]
#[command(about = "Declarative management of Xata workspaces", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Declaration file (default: <config dir>/workspaces.toml)
    #[arg(short, long, global = true, env = "XATA_PROVIDER_FILE")]
    pub file: Option<PathBuf>,

    /// State file (default: <state dir>/state.toml)
    #[arg(long, global = true, env = "XATA_PROVIDER_STATE")]
    pub state: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show what apply would change
    Plan,

    /// Create, update and delete workspaces to match the declaration
    Apply(ApplyArgs),

    /// Re-read tracked workspaces and record drift
    Refresh,

    /// Start tracking an existing workspace
    Import {
        /// Declaration key to track the workspace under
        key: String,

        /// Workspace identifier
        id: String,
    },

    /// Delete every tracked workspace
    Destroy {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Show what would be deleted without deleting
        #[arg(long)]
        dry_run: bool,
    },

    /// List every workspace visible to the API key
    List {
        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show provider metadata
    Info,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
pub struct ApplyArgs {
    /// Show what would change without applying
    #[arg(long)]
    pub dry_run: bool,

    /// Number of parallel jobs
    #[arg(short, long, default_value = "4")]
    pub jobs: u16,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}
