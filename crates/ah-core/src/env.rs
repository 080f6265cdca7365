//! `env.sh`: the one file the user's shell profile sources.

use ah_fs::{StateLayout, io::write_atomic};

use crate::Result;

/// Script that puts `bin/` on `PATH` and loads the compiled aliases.
pub fn render_env_script(layout: &StateLayout) -> String {
    let bin = layout.bin_dir();
    let aliases = layout.alias_file();
    format!(
        "# Alias Hub environment. Generated by ah.\n\
         case \":$PATH:\" in\n  *\":{bin}:\"*) ;;\n  *) export PATH=\"{bin}:$PATH\" ;;\nesac\n\
         [ -f \"{aliases}\" ] && . \"{aliases}\"\n",
        bin = bin.display(),
        aliases = aliases.display(),
    )
}

/// Write `env.sh` if it is missing. Returns whether a file was written.
pub fn ensure_env_script(layout: &StateLayout) -> Result<bool> {
    let path = layout.env_file();
    if path.is_file() {
        return Ok(false);
    }
    write_env_script(layout)?;
    Ok(true)
}

/// Unconditionally regenerate `env.sh`.
pub fn write_env_script(layout: &StateLayout) -> Result<()> {
    let path = layout.env_file();
    write_atomic(&path, render_env_script(layout).as_bytes())?;
    tracing::info!(path = ?path, "Wrote env script");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn script_references_bin_and_aliases() {
        let layout = StateLayout::new("/home/u/.ah");
        let script = render_env_script(&layout);
        assert!(script.contains("export PATH=\"/home/u/.ah/bin:$PATH\""));
        assert!(script.contains(". \"/home/u/.ah/aliases.sh\""));
    }

    #[test]
    fn ensure_does_not_overwrite() {
        let temp = TempDir::new().unwrap();
        let layout = StateLayout::new(temp.path());

        assert!(ensure_env_script(&layout).unwrap());
        fs::write(layout.env_file(), "# custom\n").unwrap();
        assert!(!ensure_env_script(&layout).unwrap());
        assert_eq!(fs::read_to_string(layout.env_file()).unwrap(), "# custom\n");
    }
}
