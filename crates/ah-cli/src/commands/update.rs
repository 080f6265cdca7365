//! update command

use ah_core::FetchOutcome;
use colored::Colorize;

use super::Context;
use crate::error::Result;

pub fn run_update(ctx: &Context) -> Result<()> {
    println!("Updating registry...");
    let report = ctx.manager.update()?;

    match report.fetch {
        FetchOutcome::Cloned => println!("  Registry cloned."),
        FetchOutcome::Updated => println!("  Registry updated."),
        FetchOutcome::Skipped => println!("  Offline; registry left as is."),
        FetchOutcome::Stale => println!("  Registry unchanged."),
    }

    match report.compile {
        Some(compiled) => {
            println!(
                "  Compiled {} aliases from {} packages.",
                compiled.aliases,
                compiled.packages.len()
            );
            for (package, reason) in &compiled.skipped {
                println!("  {} skipped {}: {}", "warning:".yellow().bold(), package, reason);
            }
            println!("{} Registry and aliases updated.", "OK".green().bold());
        }
        None => println!(
            "{} Registry updated, but compiling aliases failed. Run with --verbose for details.",
            "warning:".yellow().bold()
        ),
    }
    Ok(())
}
