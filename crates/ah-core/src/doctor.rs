//! Health checks over a state root
//!
//! Each check reports independently. With `fix`, repairable problems are
//! repaired and the check reports the repaired state.

use std::path::PathBuf;

use ah_fs::{LockConfig, StateLayout, with_lock};
use serde::Serialize;

use crate::active::ActiveSet;
use crate::compiler::compile;
use crate::env::write_env_script;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Warn,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub name: &'static str,
    pub status: CheckStatus,
    pub detail: String,
}

impl HealthCheck {
    fn new(name: &'static str, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self {
            name,
            status,
            detail: detail.into(),
        }
    }
}

/// Run every check against `layout`.
pub fn run(layout: &StateLayout, lock: &LockConfig, fix: bool) -> Result<Vec<HealthCheck>> {
    if fix {
        layout.ensure_dirs()?;
    }

    Ok(vec![
        check_root(layout),
        check_env_script(layout, fix)?,
        check_git(),
        check_links(layout, lock, fix)?,
        check_compiled(layout),
    ])
}

fn check_root(layout: &StateLayout) -> HealthCheck {
    let root = layout.root();
    if root.is_dir() {
        HealthCheck::new("root", CheckStatus::Ok, format!("{}", root.display()))
    } else {
        HealthCheck::new(
            "root",
            CheckStatus::Fail,
            format!("{} does not exist; run 'ah init'", root.display()),
        )
    }
}

fn check_env_script(layout: &StateLayout, fix: bool) -> Result<HealthCheck> {
    let path = layout.env_file();
    if path.is_file() {
        return Ok(HealthCheck::new("env.sh", CheckStatus::Ok, "present"));
    }
    if fix {
        write_env_script(layout)?;
        return Ok(HealthCheck::new("env.sh", CheckStatus::Ok, "regenerated"));
    }
    Ok(HealthCheck::new(
        "env.sh",
        CheckStatus::Warn,
        format!("{} not found", path.display()),
    ))
}

fn check_git() -> HealthCheck {
    match find_executable("git") {
        Some(path) => HealthCheck::new("git", CheckStatus::Ok, format!("{}", path.display())),
        None => HealthCheck::new("git", CheckStatus::Fail, "'git' is not on PATH"),
    }
}

fn check_links(layout: &StateLayout, lock: &LockConfig, fix: bool) -> Result<HealthCheck> {
    let active = ActiveSet::new(layout);
    let dangling = active.dangling()?;
    if dangling.is_empty() {
        return Ok(HealthCheck::new("active links", CheckStatus::Ok, "all links resolve"));
    }

    if fix {
        with_lock(layout, lock, || -> Result<()> {
            for name in &dangling {
                active.unlink(name)?;
                tracing::info!(package = %name, "Removed dangling active link");
            }
            if let Err(e) = compile(layout) {
                tracing::warn!(error = %e, "Recompile after link cleanup failed");
            }
            Ok(())
        })?;
        return Ok(HealthCheck::new(
            "active links",
            CheckStatus::Ok,
            format!("removed dangling: {}", dangling.join(", ")),
        ));
    }

    Ok(HealthCheck::new(
        "active links",
        CheckStatus::Fail,
        format!("dangling: {}", dangling.join(", ")),
    ))
}

fn check_compiled(layout: &StateLayout) -> HealthCheck {
    if layout.alias_file().is_file() {
        HealthCheck::new("aliases.sh", CheckStatus::Ok, "present")
    } else {
        HealthCheck::new(
            "aliases.sh",
            CheckStatus::Warn,
            "not compiled yet; enable a package or run 'ah update'",
        )
    }
}

/// Locate `name` on `PATH`.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path).find_map(|dir| {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        let exe = dir.join(format!("{name}.exe"));
        exe.is_file().then_some(exe)
    })
}
