//! Shared test fixtures for the Alias Hub workspace.
//!
//! Dev-dependency only, never published. [`TestState`] owns a temporary
//! state root so suites never touch the real `$HOME/.ah`.

use std::fs;
use std::path::{Path, PathBuf};

use ah_fs::StateLayout;
use ah_meta::{ALIAS_FILENAME, DESCRIPTOR_FILENAME};
use tempfile::TempDir;

/// A temporary state root with helpers to populate the registry and the
/// active set.
///
/// # Example
///
/// ```rust,no_run
/// use ah_test_utils::TestState;
///
/// let state = TestState::new();
/// state.add_package("git", &[("gs", "git status")]);
/// state.enable_link("git");
/// ```
pub struct TestState {
    temp_dir: TempDir,
}

impl Default for TestState {
    fn default() -> Self {
        Self::new()
    }
}

impl TestState {
    /// State root with `active/` and an empty registry content directory.
    pub fn new() -> Self {
        let state = Self::empty();
        let layout = state.layout();
        fs::create_dir_all(layout.active_dir()).unwrap();
        fs::create_dir_all(layout.registry_content_dir()).unwrap();
        state
    }

    /// State root with nothing in it.
    pub fn empty() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn layout(&self) -> StateLayout {
        StateLayout::new(self.root())
    }

    /// Add a well-formed registry package. Returns its directory.
    pub fn add_package(&self, name: &str, aliases: &[(&str, &str)]) -> PathBuf {
        self.add_package_with(name, &format!("{name} aliases"), aliases)
    }

    /// Like [`add_package`](Self::add_package) with an explicit description.
    pub fn add_package_with(
        &self,
        name: &str,
        description: &str,
        aliases: &[(&str, &str)],
    ) -> PathBuf {
        let descriptor = format!(
            "name: {name}\nversion: 1.0.0\ndescription: {description}\nauthor: tester\n"
        );
        let alias_lines: String = aliases
            .iter()
            .map(|(alias, command)| format!("alias {alias}='{command}'\n"))
            .collect();
        self.add_raw_package(name, Some(&descriptor), Some(&alias_lines))
    }

    /// Add a registry package with exactly the given files; `None` leaves
    /// the file out.
    pub fn add_raw_package(
        &self,
        name: &str,
        descriptor: Option<&str>,
        aliases: Option<&str>,
    ) -> PathBuf {
        let dir = self.layout().registry_entry(name);
        fs::create_dir_all(&dir).unwrap();
        if let Some(descriptor) = descriptor {
            fs::write(dir.join(DESCRIPTOR_FILENAME), descriptor).unwrap();
        }
        if let Some(aliases) = aliases {
            fs::write(dir.join(ALIAS_FILENAME), aliases).unwrap();
        }
        dir
    }

    /// Link `name` into `active/` directly, bypassing the lifecycle manager.
    pub fn enable_link(&self, name: &str) {
        let layout = self.layout();
        ah_fs::link::create_link(&layout.registry_entry(name), &layout.active_entry(name))
            .unwrap_or_else(|e| panic!("failed to link {name}: {e}"));
    }

    /// Names currently in `active/`, sorted.
    pub fn active_names(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.layout().active_dir())
            .map(|entries| {
                entries
                    .flatten()
                    .filter_map(|e| e.file_name().into_string().ok())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Contents of the compiled alias file, or empty if not compiled yet.
    pub fn compiled(&self) -> String {
        fs::read_to_string(self.layout().alias_file()).unwrap_or_default()
    }
}
