//! doctor command

use ah_core::{CheckStatus, HealthCheck, doctor};
use colored::Colorize;

use super::Context;
use crate::error::{CliError, Result};
use crate::profile;

pub fn run_doctor(ctx: &Context, fix: bool) -> Result<()> {
    println!("Running doctor...");

    let config = ctx.manager.config();
    let mut checks = doctor::run(ctx.manager.layout(), &config.lock, fix)?;
    checks.push(check_shell());

    for check in &checks {
        let label = match check.status {
            CheckStatus::Ok => "[OK]".green().bold(),
            CheckStatus::Warn => "[WARN]".yellow().bold(),
            CheckStatus::Fail => "[FAIL]".red().bold(),
        };
        println!("{} {}: {}", label, check.name, check.detail);
    }

    let failed = checks
        .iter()
        .filter(|c| c.status == CheckStatus::Fail)
        .count();
    if failed > 0 {
        if !fix {
            println!("  -> Hint: Try running 'ah doctor --fix' or 'ah init'");
        }
        return Err(CliError::user(format!("{failed} checks failed")));
    }
    Ok(())
}

fn check_shell() -> HealthCheck {
    let Ok(rc) = profile::detect_rc_file() else {
        return HealthCheck {
            name: "shell",
            status: CheckStatus::Warn,
            detail: "home directory not found".to_string(),
        };
    };

    let content = std::fs::read_to_string(&rc).unwrap_or_default();
    if profile::is_configured(&content) {
        HealthCheck {
            name: "shell",
            status: CheckStatus::Ok,
            detail: format!("configured in {}", rc.display()),
        }
    } else {
        HealthCheck {
            name: "shell",
            status: CheckStatus::Warn,
            detail: "not configured; run 'ah init' to set up".to_string(),
        }
    }
}
