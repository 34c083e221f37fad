//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Loan task board engine.
///
/// Reads and reorders the task board of a loan. Configuration comes from
/// `./loanboard.json5`, `~/.config/loanboard/config.json5` and the
/// `LOANBOARD_API_URL` and `LOANBOARD_LOAN` environment variables.
#[derive(Parser, Debug)]
#[command(name = "loanboard")]
#[command(version)]
#[command(about = "Inspect and reorder loan task boards")]
pub struct Cli {
    /// Read configuration from this file instead of the default locations
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Task API base URL, overriding the configuration
    #[arg(long, global = true, value_name = "URL")]
    pub api: Option<String>,

    /// Loan whose board to open, overriding the configured default
    #[arg(long, global = true, value_name = "ID")]
    pub loan: Option<u64>,

    /// Work against an in-memory board seeded with sample tasks
    #[arg(long, global = true)]
    pub offline: bool,

    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print each column with its cards in order
    Show,

    /// Move a card to a column, optionally in front of another card
    Move {
        /// Card to move
        card: u64,
        /// Target column (a backend status, e.g. "In Review")
        column: String,
        /// Place the card in front of this card instead of at the end
        #[arg(long, value_name = "CARD")]
        before: Option<u64>,
    },

    /// Create a task at the end of a column
    Add {
        /// Column to add the task to
        column: String,
        /// Task title
        title: String,
        /// Task description
        #[arg(long, short, default_value = "")]
        description: String,
    },

    /// Delete a task
    Remove {
        /// Card to delete
        card: u64,
    },

    /// Print the effective configuration as JSON
    Config,
}
