//! Managed block in the operator's shell rc file
//!
//! ```text
//! # >>> Alias Hub >>>
//! export AH_PATH="/home/me/.ah"
//! [ -f "$AH_PATH/env.sh" ] && . "$AH_PATH/env.sh"
//! # <<< Alias Hub <<<
//! ```

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::{CliError, Result};

pub const BLOCK_START: &str = "# >>> Alias Hub >>>";
pub const BLOCK_END: &str = "# <<< Alias Hub <<<";

/// `.zshrc` for zsh, `.bashrc` for everything else.
pub fn rc_file_for(home: &Path, shell: Option<&str>) -> PathBuf {
    match shell {
        Some(shell) if shell.contains("zsh") => home.join(".zshrc"),
        _ => home.join(".bashrc"),
    }
}

/// rc file of the current user, chosen by `$SHELL`.
pub fn detect_rc_file() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| CliError::user("Could not find home directory."))?;
    let shell = std::env::var("SHELL").ok();
    Ok(rc_file_for(&home, shell.as_deref()))
}

pub fn render_block(root: &Path) -> String {
    format!(
        "{BLOCK_START}\nexport AH_PATH=\"{}\"\n[ -f \"$AH_PATH/env.sh\" ] && . \"$AH_PATH/env.sh\"\n{BLOCK_END}\n",
        root.display()
    )
}

/// True if the profile already loads Alias Hub, managed block or not.
pub fn is_configured(content: &str) -> bool {
    content.contains(BLOCK_START) || content.contains("export AH_PATH=")
}

/// Append the managed block to `rc` unless it is already configured.
/// Returns whether the file changed.
pub fn install_block(rc: &Path, root: &Path) -> Result<bool> {
    let content = match std::fs::read_to_string(rc) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };
    if is_configured(&content) {
        return Ok(false);
    }

    let mut updated = content;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push('\n');
    updated.push_str(&render_block(root));
    std::fs::write(rc, updated)?;
    tracing::info!(rc = %rc.display(), "Added shell profile block");
    Ok(true)
}

/// `content` without any managed blocks, or `None` if there were none.
pub fn strip_block(content: &str) -> Result<Option<String>> {
    let pattern = format!(
        r"(?ms)\n?^{}[^\n]*\n.*?^{}[^\n]*(\n|\z)",
        regex::escape(BLOCK_START),
        regex::escape(BLOCK_END)
    );
    let re = Regex::new(&pattern)?;
    if !re.is_match(content) {
        return Ok(None);
    }
    Ok(Some(re.replace_all(content, "").into_owned()))
}

/// Remove the managed block from `rc`. Returns whether the file changed.
pub fn remove_block(rc: &Path) -> Result<bool> {
    let content = match std::fs::read_to_string(rc) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    };
    match strip_block(&content)? {
        Some(stripped) => {
            std::fs::write(rc, stripped)?;
            tracing::info!(rc = %rc.display(), "Removed shell profile block");
            Ok(true)
        }
        None => Ok(false),
    }
}
