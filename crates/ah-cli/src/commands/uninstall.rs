//! uninstall command

use colored::Colorize;

use super::Context;
use crate::error::Result;
use crate::profile;

pub fn run_uninstall(ctx: &Context) -> Result<()> {
    let root = ctx.manager.config().root();

    println!("{} This will delete:", "DANGER:".red().bold());
    println!("  - All enabled alias packages");
    println!("  - The registry cache");
    println!("  - The entire {} directory", root.display());
    println!("  - The Alias Hub block in your shell profile");
    println!();

    if !ctx
        .prompter
        .typed_confirmation("Are you sure? Type 'DELETE' to confirm", "DELETE")?
    {
        println!("Uninstall cancelled.");
        return Ok(());
    }

    if root.exists() {
        println!("Removing {}...", root.display());
        ctx.manager.purge()?;
    }

    let rc = profile::detect_rc_file()?;
    if profile::remove_block(&rc)? {
        println!("Cleaned configuration from {}", rc.display());
    }
    println!("{} Uninstall complete.", "OK".green().bold());

    if let Ok(exe) = std::env::current_exe() {
        println!();
        println!("To remove the binary itself, delete: {}", exe.display());
    }
    Ok(())
}
