//! enable, disable, and remove

use colored::Colorize;

use super::Context;
use crate::error::Result;

pub fn run_enable(ctx: &Context, name: &str) -> Result<()> {
    ctx.manager.ensure_dirs()?;
    ctx.manager.enable_fresh(name)?;
    println!("{} Package '{}' enabled.", "OK".green().bold(), name);
    Ok(())
}

pub fn run_disable(ctx: &Context, name: &str) -> Result<()> {
    ctx.manager.disable(name)?;
    println!("{} Package '{}' disabled.", "OK".green().bold(), name);
    Ok(())
}

pub fn run_remove(ctx: &Context, name: &str) -> Result<()> {
    if ctx.manager.remove(name)? {
        println!("{} Package '{}' removed.", "OK".green().bold(), name);
    } else {
        println!(
            "{} Package '{}' was not enabled; nothing to remove.",
            "OK".green().bold(),
            name
        );
    }
    Ok(())
}
