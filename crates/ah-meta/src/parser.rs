//! Alias-file parser
//!
//! Only lines of the form `alias name='command'` (or double-quoted, or
//! unquoted) are recognized. Comments, functions, exports, and any other
//! shell code are ignored.
//!
//! Names are restricted to characters a shell never interprets, since they
//! are re-emitted unquoted into the compiled alias file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A single alias definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasDef {
    /// Alias name, e.g. `ll` in `alias ll='ls -la'`
    pub name: String,
    /// Unquoted command, e.g. `ls -la`
    pub command: String,
    /// File the definition was read from
    pub source: PathBuf,
}

/// Parse every alias definition in `path`, in file order.
///
/// Duplicate names within one file are kept as-is.
pub fn parse_aliases(path: &Path) -> Result<Vec<AliasDef>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(Error::AliasFileNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(Error::io(path, e)),
    };

    let aliases: Vec<AliasDef> = content
        .lines()
        .filter_map(|line| parse_alias_line(line, path))
        .collect();

    tracing::debug!(path = ?path, count = aliases.len(), "Parsed alias file");
    Ok(aliases)
}

/// Parse one line. Returns `None` for anything that is not an alias definition.
///
/// The line is split on the first `=` only, and one layer of matching
/// quotes is stripped from the value.
pub fn parse_alias_line(line: &str, source: &Path) -> Option<AliasDef> {
    let line = line.trim();
    let rest = line.strip_prefix("alias ")?;
    let (name_part, value_part) = rest.split_once('=')?;

    let name = name_part.trim();
    let command = strip_quotes(value_part.trim());

    if name.is_empty() || command.is_empty() {
        return None;
    }
    if !is_valid_alias_name(name) {
        tracing::warn!(source = ?source, name, "Ignoring alias with unsafe name");
        return None;
    }

    Some(AliasDef {
        name: name.to_string(),
        command: command.to_string(),
        source: source.to_path_buf(),
    })
}

/// True when `name` is non-empty, does not start with `-`, and only uses
/// `A-Z a-z 0-9 _ . : + @ % -`.
pub fn is_valid_alias_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('-') && name.chars().all(is_alias_name_char)
}

fn is_alias_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':' | '+' | '@' | '%' | '-')
}

fn strip_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'\'' || first == b'"') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn line(text: &str) -> Option<(String, String)> {
        parse_alias_line(text, Path::new("alias.sh")).map(|a| (a.name, a.command))
    }

    #[rstest]
    #[case("alias ll='ls -la'", "ll", "ls -la")]
    #[case("alias gs=\"git status\"", "gs", "git status")]
    #[case("alias c=clear", "c", "clear")]
    #[case("   alias  ll = 'ls -la'  ", "ll", "ls -la")]
    #[case("alias complex='echo \"hello=world\"'", "complex", "echo \"hello=world\"")]
    #[case("alias q='''", "q", "'")]
    fn recognizes_alias_lines(#[case] input: &str, #[case] name: &str, #[case] command: &str) {
        assert_eq!(line(input), Some((name.to_string(), command.to_string())));
    }

    #[rstest]
    #[case("# alias ll='ls -la'")]
    #[case("export PATH=$PATH:/bin")]
    #[case("alias noequals")]
    #[case("alias ='ls'")]
    #[case("alias empty=''")]
    #[case("aliasll='ls'")]
    #[case("")]
    #[case("alias x;touch /tmp/owned;y='ls'")]
    #[case("alias $(reboot)='ls'")]
    #[case("alias `id`='ls'")]
    #[case("alias two words='ls'")]
    #[case("alias it's='ls'")]
    #[case("alias -p='ls'")]
    #[case("alias a|b='ls'")]
    fn ignores_other_lines(#[case] input: &str) {
        assert_eq!(line(input), None);
    }

    #[rstest]
    #[case("ll", true)]
    #[case("git-st", true)]
    #[case("k8s.get", true)]
    #[case("c++", true)]
    #[case("a:b@c%d_e", true)]
    #[case("-x", false)]
    #[case("a b", false)]
    #[case("a;b", false)]
    #[case("a$b", false)]
    #[case("a'b", false)]
    #[case("a/b", false)]
    #[case("é", false)]
    #[case("", false)]
    fn alias_name_charset(#[case] name: &str, #[case] valid: bool) {
        assert_eq!(is_valid_alias_name(name), valid);
    }

    #[test]
    fn unsafe_names_do_not_hide_later_lines() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("alias.sh");
        fs::write(&path, "alias x;touch y='ls'\nalias ok='ls -la'\n").unwrap();

        let names: Vec<String> = parse_aliases(&path)
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["ok"]);
    }

    #[test]
    fn mismatched_quotes_are_kept() {
        assert_eq!(
            line("alias odd='ls -la\""),
            Some(("odd".to_string(), "'ls -la\"".to_string()))
        );
    }

    #[test]
    fn parse_file_keeps_order_and_duplicates() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("alias.sh");
        fs::write(
            &path,
            "#!/bin/sh\n# git helpers\nalias gs='git status'\nfunction f() { :; }\nalias gs='git status -sb'\nalias gd='git diff'\n",
        )
        .unwrap();

        let aliases = parse_aliases(&path).unwrap();
        let names: Vec<&str> = aliases.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["gs", "gs", "gd"]);
        assert_eq!(aliases[1].command, "git status -sb");
        assert_eq!(aliases[0].source, path);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = parse_aliases(Path::new("/definitely/not/here/alias.sh")).unwrap_err();
        assert!(err.is_not_found());
    }
}
