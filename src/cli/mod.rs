pub mod commands;
pub mod context;
pub mod logging;
pub mod output;

use clap::{Parser, Subcommand};

/// Record a change log of entity lifecycle events.
#[derive(Parser, Debug)]
#[command(name = "changelog", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to an alternative project directory (default: .changelog)
    #[arg(long, global = true, env = "CHANGELOG_DIR")]
    pub dir: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the change log in the current project
    Init,

    /// Replay lifecycle events from a JSON-lines file into the change log
    Record {
        /// Event log to replay
        file: String,
    },

    /// Show recorded changes
    Log {
        /// Filter by subject type
        #[arg(long = "type")]
        subject_type: Option<String>,
        /// Filter by subject identifier
        #[arg(long)]
        id: Option<String>,
        /// Filter by action (create, update, remove)
        #[arg(long)]
        action: Option<String>,
        /// Filter entries since this date (ISO 8601)
        #[arg(long)]
        since: Option<String>,
        /// Show last N entries
        #[arg(long)]
        last: Option<usize>,
    },
}
