//! Alias compiler
//!
//! Regenerates `aliases.sh` from scratch out of the current active set. The
//! output is a pure function of the active set: packages in lexicographic
//! order, aliases in file order.

use std::fmt::Write as _;

use ah_fs::{StateLayout, io::write_atomic};
use ah_meta::{ALIAS_FILENAME, is_valid_alias_name, parse_aliases};

use crate::active::ActiveSet;
use crate::{Error, Result};

const HEADER: &str = "# Generated by ah. Do not edit; changes are overwritten.\n";

/// Result of one compile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileReport {
    /// Packages whose aliases were emitted
    pub packages: Vec<String>,
    /// Total alias lines written
    pub aliases: usize,
    /// Active entries left out, with the reason
    pub skipped: Vec<(String, String)>,
}

/// Rewrite the compiled alias file for the current active set.
///
/// Dangling links and unreadable alias files are skipped with a warning.
/// Only a failure to write the output is an error.
pub fn compile(layout: &StateLayout) -> Result<CompileReport> {
    let active = ActiveSet::new(layout);
    let mut report = CompileReport::default();
    let mut out = String::from(HEADER);

    for name in active.list()? {
        let Some(dir) = active.resolve(&name) else {
            tracing::warn!(package = %name, "Skipping dangling active link");
            report.skipped.push((name, "link target is missing".to_string()));
            continue;
        };

        let aliases = match parse_aliases(&dir.join(ALIAS_FILENAME)) {
            Ok(aliases) => aliases,
            Err(e) => {
                tracing::warn!(package = %name, error = %e, "Skipping unreadable alias file");
                report.skipped.push((name, e.to_string()));
                continue;
            }
        };

        let _ = writeln!(out, "\n# {name}");
        for alias in &aliases {
            // Names go out unquoted.
            if !is_valid_alias_name(&alias.name) {
                tracing::warn!(package = %name, alias = %alias.name, "Skipping unsafe alias name");
                continue;
            }
            let _ = writeln!(out, "alias {}={}", alias.name, shell_quote(&alias.command));
            report.aliases += 1;
        }
        report.packages.push(name);
    }

    let path = layout.alias_file();
    write_atomic(&path, out.as_bytes()).map_err(|e| Error::CompileFailed {
        reason: e.to_string(),
    })?;

    tracing::info!(
        packages = report.packages.len(),
        aliases = report.aliases,
        "Compiled aliases"
    );
    Ok(report)
}

/// POSIX single-quote `value`: `'` becomes `'\''`.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ah_test_utils::TestState;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::fs;

    #[rstest]
    #[case("ls -la", "'ls -la'")]
    #[case("echo \"hello=world\"", "'echo \"hello=world\"'")]
    #[case("echo 'hi'", r"'echo '\''hi'\'''")]
    #[case("", "''")]
    fn quoting(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(shell_quote(input), expected);
    }

    #[test]
    fn empty_active_set_writes_header_only() {
        let state = TestState::new();
        let report = compile(&state.layout()).unwrap();

        assert_eq!(report, CompileReport::default());
        let content = fs::read_to_string(state.layout().alias_file()).unwrap();
        assert_eq!(content, HEADER);
    }

    #[cfg(unix)]
    #[test]
    fn packages_are_emitted_in_name_order() {
        let state = TestState::new();
        state.add_package("zsh", &[("z", "zsh -l")]);
        state.add_package("git", &[("gs", "git status"), ("gd", "git diff")]);
        state.enable_link("zsh");
        state.enable_link("git");

        let report = compile(&state.layout()).unwrap();
        assert_eq!(report.packages, vec!["git", "zsh"]);
        assert_eq!(report.aliases, 3);

        let content = fs::read_to_string(state.layout().alias_file()).unwrap();
        let lines: Vec<&str> = content.lines().filter(|l| l.starts_with("alias ")).collect();
        assert_eq!(
            lines,
            vec!["alias gs='git status'", "alias gd='git diff'", "alias z='zsh -l'"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn broken_packages_are_skipped() {
        let state = TestState::new();
        state.add_package("ok", &[("o", "true")]);
        state.add_raw_package("noalias", Some("name: noalias\nversion: 1\n"), None);
        let gone = state.add_package("gone", &[("g", "true")]);
        state.enable_link("ok");
        state.enable_link("noalias");
        state.enable_link("gone");
        fs::remove_dir_all(gone).unwrap();

        let report = compile(&state.layout()).unwrap();
        assert_eq!(report.packages, vec!["ok"]);
        let skipped: Vec<&str> = report.skipped.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(skipped, vec!["gone", "noalias"]);
    }

    #[cfg(unix)]
    #[test]
    fn sourcing_compiled_file_runs_no_injected_names() {
        let state = TestState::new();
        let marker = state.root().join("pwned");
        let dir = state.add_package("evil", &[("ok", "echo ok")]);
        fs::write(
            dir.join(ALIAS_FILENAME),
            format!(
                "alias x;touch {m};y='ls'\n\
                 alias $(touch {m})='ls'\n\
                 alias `touch {m}`='ls'\n\
                 alias ok='echo ok'\n",
                m = marker.display()
            ),
        )
        .unwrap();
        state.enable_link("evil");

        let report = compile(&state.layout()).unwrap();
        assert_eq!(report.aliases, 1);

        let content = fs::read_to_string(state.layout().alias_file()).unwrap();
        assert!(!content.contains("touch"));

        let status = std::process::Command::new("sh")
            .arg("-c")
            .arg(format!(". '{}'", state.layout().alias_file().display()))
            .status()
            .unwrap();
        assert!(status.success());
        assert!(!marker.exists());
    }

    #[cfg(unix)]
    #[test]
    fn compile_is_deterministic() {
        let state = TestState::new();
        state.add_package("a", &[("x", "echo a")]);
        state.add_package("b", &[("x", "echo b")]);
        state.enable_link("b");
        state.enable_link("a");

        compile(&state.layout()).unwrap();
        let first = fs::read_to_string(state.layout().alias_file()).unwrap();
        compile(&state.layout()).unwrap();
        let second = fs::read_to_string(state.layout().alias_file()).unwrap();
        assert_eq!(first, second);
        assert!(first.find("echo a").unwrap() < first.find("echo b").unwrap());
    }
}
