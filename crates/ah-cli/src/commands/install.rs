//! install command
//!
//! Preview and conflict check happen under the state lock; the prompt does
//! not hold it. Enabling afterwards re-checks conflicts inside the lock.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use ah_core::{Conflict, InstallOutcome, InstallPreview};
use ah_session::{ResolutionSession, SessionServer, SessionSummary};
use colored::Colorize;

use super::Context;
use crate::browser;
use crate::error::Result;

pub fn run_install(ctx: &Context, name: &str) -> Result<()> {
    println!();
    println!("{} {}...", "Installing".bold(), name.cyan());

    match ctx.manager.install(name)? {
        InstallOutcome::Ready { preview } => {
            print_preview(&preview);
            println!();
            if !ctx.prompter.confirm("Proceed to enable?", true)? {
                println!("Package installed but NOT enabled. Use 'ah enable' later.");
                return Ok(());
            }
            ctx.manager.enable_checked(name)?;
            println!(
                "{} Installation complete! {} aliases available.",
                "OK".green().bold(),
                preview.aliases.len()
            );
        }
        InstallOutcome::Conflicts { preview, conflicts } => {
            print_preview(&preview);
            print_conflicts(name, &conflicts);
            println!();
            if !ctx.prompter.confirm("Launch Web UI to resolve?", true)? {
                println!("Installation aborted.");
                return Ok(());
            }
            let summary = resolve_in_browser(ctx, name)?;
            print_summary(&summary);
        }
    }
    Ok(())
}

fn print_preview(preview: &InstallPreview) {
    let meta = &preview.metadata;
    println!();
    println!("{}: {} ({})", "Package".dimmed(), meta.name.bold(), meta.version);
    println!("{}: {}", "Desc".dimmed(), meta.description);
    println!("{}: {}", "Author".dimmed(), meta.author);
    if !meta.website.is_empty() {
        println!("{}: {}", "Web".dimmed(), meta.website);
    }
    println!();
    println!("Contains {} aliases:", preview.aliases.len());
    for alias in &preview.aliases {
        println!("  {} = {}", alias.name.green(), alias.command);
    }
}

fn print_conflicts(name: &str, conflicts: &[Conflict]) {
    println!();
    println!("{}", "[!] CONFLICTS DETECTED".yellow().bold());
    println!(
        "Package '{}' has {} conflicting aliases.",
        name,
        conflicts.len()
    );
    for conflict in conflicts {
        println!(
            "  {:<12} {} {} {}",
            conflict.alias.yellow(),
            format!("{}: {}", conflict.existing.package, conflict.existing.command).dimmed(),
            "->".dimmed(),
            format!("{}: {}", conflict.new.package, conflict.new.command)
        );
    }
}

/// Serve one resolution session on loopback until the page ends it, then
/// recompile.
fn resolve_in_browser(ctx: &Context, name: &str) -> Result<SessionSummary> {
    let session = ResolutionSession::start(Arc::clone(&ctx.manager), name)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let session = runtime.block_on(async {
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, 0));
        let server = SessionServer::bind(session, addr).await?;
        let url = server.url()?;
        println!();
        println!("Resolve conflicts at {}", url.cyan().underline());
        if !browser::open(&url) {
            println!("Open the address above in a browser to continue.");
        }
        server.serve().await
    })?;

    println!();
    println!("Resolution session ended.");
    Ok(session.finish()?)
}

fn print_summary(summary: &SessionSummary) {
    println!();
    println!(
        "{}: {} ({})",
        "Package".dimmed(),
        summary.package.bold(),
        summary.version
    );
    if summary.replaced() {
        println!("{} {}", "OK".green().bold(), outcome_message(summary));
    } else {
        println!("{}", outcome_message(summary));
    }
}

fn outcome_message(summary: &SessionSummary) -> String {
    if summary.replaced() {
        return format!(
            "Installation complete! {} aliases available.",
            summary.alias_count
        );
    }
    let mut message = if summary.decisions.is_empty() {
        "No decisions recorded.".to_string()
    } else {
        format!(
            "Kept existing aliases for {} conflicts.",
            summary.decisions.len()
        )
    };
    if summary.unresolved > 0 && !summary.decisions.is_empty() {
        message.push_str(&format!(" {} left undecided.", summary.unresolved));
    }
    message.push_str(&format!(" '{}' was not enabled.", summary.package));
    message
}
