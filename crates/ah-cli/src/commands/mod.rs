//! Command implementations for ah-cli

pub mod doctor;
pub mod init;
pub mod install;
pub mod list;
pub mod toggle;
pub mod uninstall;
pub mod update;

use std::sync::Arc;

use ah_core::PackageManager;
use colored::Colorize;

use crate::cli::Commands;
use crate::error::{CliError, Result};
use crate::interactive::Prompter;

/// What every command runs against.
pub struct Context {
    pub manager: Arc<PackageManager>,
    pub prompter: Prompter,
}

pub fn execute(command: Commands, ctx: &Context) -> Result<()> {
    match command {
        Commands::Install { packages } => {
            for_each_package(&packages, |name| install::run_install(ctx, name))
        }
        Commands::Enable { packages } => {
            for_each_package(&packages, |name| toggle::run_enable(ctx, name))
        }
        Commands::Disable { packages } => {
            for_each_package(&packages, |name| toggle::run_disable(ctx, name))
        }
        Commands::Remove { packages } => {
            for_each_package(&packages, |name| toggle::run_remove(ctx, name))
        }
        Commands::List { all } => list::run_list(ctx, all),
        Commands::Search { query } => list::run_search(ctx, &query),
        Commands::Update => update::run_update(ctx),
        Commands::Init => init::run_init(ctx),
        Commands::Doctor { fix } => doctor::run_doctor(ctx, fix),
        Commands::Uninstall => uninstall::run_uninstall(ctx),
    }
}

/// Run `op` for each package independently. Failures are reported as they
/// happen and summarized in the returned error.
fn for_each_package(packages: &[String], mut op: impl FnMut(&str) -> Result<()>) -> Result<()> {
    let mut failed = Vec::new();
    for name in packages {
        if let Err(e) = op(name) {
            eprintln!("{} {}: {}", "error".red().bold(), name, e);
            failed.push(name.as_str());
        }
    }

    match failed.len() {
        0 => Ok(()),
        1 if packages.len() == 1 => Err(CliError::user(format!("'{}' failed", failed[0]))),
        n => Err(CliError::user(format!(
            "{n} of {} packages failed: {}",
            packages.len(),
            failed.join(", ")
        ))),
    }
}
