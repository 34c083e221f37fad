//! loanboard - task board engine for loan files.
//!
//! Commands:
//! - `loanboard show`: Print the board of a loan
//! - `loanboard move <card> <column> [--before <card>]`: Drop a card and commit
//! - `loanboard add <column> <title>`: Create a task
//! - `loanboard remove <card>`: Delete a task
//! - `loanboard config`: Print the effective configuration
//!
//! Environment variables:
//! - LOANBOARD_API_URL: Task API base URL
//! - LOANBOARD_LOAN: Loan to open when `--loan` is not given
//! - RUST_LOG: Log filter (default `warn`)

mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use loanboard_client::{HttpTaskApi, InMemoryTaskApi};
use loanboard_config::{Config, ENV_API_URL, ENV_LOAN};
use loanboard_protocol::dummy::dummy_cards;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

/// Loan used by `--offline` when none is configured.
const OFFLINE_LOAN: u64 = 1;

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the configuration with command-line flags layered over the
/// environment. Validation runs once, after every override.
fn load_config(cli: &Cli) -> Result<Config> {
    let lookup = |name: &str| match name {
        ENV_API_URL if cli.api.is_some() => cli.api.clone(),
        ENV_LOAN if cli.loan.is_some() => cli.loan.map(|loan| loan.to_string()),
        _ => std::env::var(name).ok(),
    };
    let config = Config::load_with(cli.config.as_deref(), lookup);
    match &cli.config {
        Some(path) => config.with_context(|| format!("failed to load {}", path.display())),
        None => Ok(config?),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    if let Commands::Config = cli.command {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let columns = config.column_set()?;
    let mut out = std::io::stdout().lock();

    if cli.offline {
        let loan = config.default_loan.unwrap_or(OFFLINE_LOAN);
        let api = InMemoryTaskApi::seeded(loan, dummy_cards());
        commands::execute(api, loan, columns, &cli.command, &mut out).await
    } else {
        let loan = config
            .default_loan
            .context("no loan selected: pass --loan, set LOANBOARD_LOAN or default_loan")?;
        let api = HttpTaskApi::new(config.api.url()?, config.api.timeout())?;
        commands::execute(api, loan, columns, &cli.command, &mut out).await
    }
}
