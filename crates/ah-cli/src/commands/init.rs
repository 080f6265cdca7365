//! init command

use colored::Colorize;

use super::Context;
use crate::error::Result;
use crate::profile;

pub fn run_init(ctx: &Context) -> Result<()> {
    ctx.manager.ensure_dirs()?;
    let root = ctx.manager.config().root();
    println!("{} State directory ready at {}", "OK".green().bold(), root.display());

    let rc = profile::detect_rc_file()?;
    if !profile::install_block(&rc, root)? {
        println!(
            "{} Alias Hub is already configured in {}",
            "OK".green().bold(),
            rc.display()
        );
        return Ok(());
    }

    println!(
        "{} Setup complete! Added configuration to {}",
        "OK".green().bold(),
        rc.display()
    );
    println!("Restart your terminal or run:");
    println!("  {}", format!("source {}", rc.display()).cyan());
    Ok(())
}
