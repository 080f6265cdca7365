//! Alias Hub CLI
//!
//! Installs, enables, and removes shell alias packages from a shared
//! registry.

mod browser;
mod cli;
mod commands;
mod error;
mod interactive;
mod profile;

use std::sync::Arc;

use ah_core::{EngineConfig, PackageManager};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use commands::Context;
use error::Result;
use interactive::Prompter;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        println!("{} Alias Hub", "ah".green().bold());
        println!();
        println!("Run {} for available commands.", "ah --help".cyan());
        return Ok(());
    };

    let mut config = EngineConfig::from_env()?;
    if let Some(root) = cli.root {
        config = config.with_root(root);
    }
    tracing::debug!(root = ?config.root, "Using state root");

    let ctx = Context {
        manager: Arc::new(PackageManager::new(config)),
        prompter: Prompter::new(cli.yes),
    };
    commands::execute(command, &ctx)
}

/// `RUST_LOG` wins; otherwise `--verbose` selects debug and the default is
/// warn. Logs go to stderr so they never mix with command output.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();
}
