//! list and search

use ah_core::{PackageListing, PackageStatus};
use colored::Colorize;

use super::Context;
use crate::error::Result;

pub fn run_list(ctx: &Context, all: bool) -> Result<()> {
    let rows = ctx.manager.list(all)?;
    if rows.is_empty() {
        if all {
            println!("No packages found.");
        } else {
            println!("No installed packages. Use {} to see the registry.", "ah list --all".cyan());
        }
        return Ok(());
    }
    print_table(&rows);
    Ok(())
}

pub fn run_search(ctx: &Context, query: &str) -> Result<()> {
    let hits = ctx.manager.search(query)?;
    if hits.is_empty() {
        println!("No packages match '{}'.", query);
        return Ok(());
    }
    print_table(&hits);
    println!();
    println!(
        "{} {} found. Use {} to add one.",
        "Total:".dimmed(),
        hits.len(),
        "ah install <name>".cyan()
    );
    Ok(())
}

fn print_table(rows: &[PackageListing]) {
    println!("{:<20} {:<12} {}", "PACKAGE".bold(), "STATUS".bold(), "DESCRIPTION".bold());
    println!("{}", "-".repeat(60).dimmed());
    for row in rows {
        let status = format!("[{}]", row.status);
        let status = match row.status {
            PackageStatus::Enabled => status.green(),
            PackageStatus::Available => status.normal(),
        };
        println!("{:<20} {:<12} {}", row.name, status, row.description);
    }
}
