//! Active set repository
//!
//! The active set is the `active/` directory: one link per enabled package,
//! pointing into the registry content directory. All reads here tolerate a
//! missing directory; writes are expected to run under the state lock.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use ah_fs::{StateLayout, link};

use crate::Result;
use crate::registry::validate_name;

/// Repository over `active/` rooted at an injected state layout.
#[derive(Debug, Clone)]
pub struct ActiveSet {
    dir: PathBuf,
}

impl ActiveSet {
    pub fn new(layout: &StateLayout) -> Self {
        Self {
            dir: layout.active_dir(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Enabled package names in lexicographic order, dangling links included.
    ///
    /// Returns an empty list when `active/` does not exist yet.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ah_fs::Error::io(&self.dir, e).into()),
        };

        let mut names: Vec<String> = entries
            .flatten()
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| !name.starts_with('.'))
            .collect();
        names.sort();
        Ok(names)
    }

    pub fn contains(&self, name: &str) -> bool {
        validate_name(name).is_ok() && link::entry_exists(&self.entry(name))
    }

    /// Point `active/<name>` at `target`, replacing whatever link was there.
    pub fn link(&self, name: &str, target: &Path) -> Result<()> {
        validate_name(name)?;
        let entry = self.entry(name);
        if link::remove_link(&entry)? {
            tracing::debug!(package = name, "Removed previous active link");
        }
        link::create_link(target, &entry)?;
        Ok(())
    }

    /// Remove `active/<name>`. Returns `false` if it was not there.
    pub fn unlink(&self, name: &str) -> Result<bool> {
        validate_name(name)?;
        Ok(link::remove_link(&self.entry(name))?)
    }

    /// Link target of `name`, if enabled.
    pub fn target(&self, name: &str) -> Result<Option<PathBuf>> {
        validate_name(name)?;
        Ok(link::read_link(&self.entry(name))?)
    }

    /// Resolved package directory, skipping dangling links.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let entry = self.entry(name);
        if entry.is_dir() { Some(entry) } else { None }
    }

    /// Names whose link no longer resolves.
    pub fn dangling(&self) -> Result<Vec<String>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|name| link::is_dangling(&self.entry(name)))
            .collect())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use ah_test_utils::TestState;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_active_dir_is_empty() {
        let state = TestState::empty();
        let active = ActiveSet::new(&state.layout());
        assert!(active.list().unwrap().is_empty());
        assert!(active.dangling().unwrap().is_empty());
        assert!(!active.contains("git"));
    }

    #[test]
    fn link_relinks_and_unlink_reports() {
        let state = TestState::new();
        let target = state.add_package("git", &[("gs", "git status")]);
        let active = ActiveSet::new(&state.layout());

        active.link("git", &target).unwrap();
        active.link("git", &target).unwrap();
        assert_eq!(active.list().unwrap(), vec!["git"]);
        assert_eq!(active.target("git").unwrap(), Some(target));

        assert!(active.unlink("git").unwrap());
        assert!(!active.unlink("git").unwrap());
        assert_eq!(active.target("git").unwrap(), None);
    }

    #[test]
    fn list_is_sorted_and_skips_hidden() {
        let state = TestState::new();
        let active = ActiveSet::new(&state.layout());
        for name in ["zsh", "docker", "git"] {
            let dir = state.add_package(name, &[]);
            active.link(name, &dir).unwrap();
        }
        fs::write(state.layout().active_dir().join(".DS_Store"), "").unwrap();

        assert_eq!(active.list().unwrap(), vec!["docker", "git", "zsh"]);
    }

    #[test]
    fn dangling_links_are_listed_but_not_resolved() {
        let state = TestState::new();
        let dir = state.add_package("gone", &[("g", "true")]);
        let active = ActiveSet::new(&state.layout());
        active.link("gone", &dir).unwrap();
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(active.list().unwrap(), vec!["gone"]);
        assert_eq!(active.dangling().unwrap(), vec!["gone"]);
        assert!(active.resolve("gone").is_none());
    }
}
