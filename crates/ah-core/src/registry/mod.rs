//! Registry content directory
//!
//! The registry is the local clone of the shared package collection. Its
//! `registry/` subdirectory holds one directory per package. The engine only
//! reads it; [`transport`] is the one writer.

pub mod transport;

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use ah_fs::StateLayout;
use ah_meta::{ALIAS_FILENAME, PackageMetadata};

use crate::{Error, Result};

pub use transport::{FetchOutcome, GitTransport, OfflineTransport, RegistryTransport};

/// A package that passed structural validation.
#[derive(Debug, Clone)]
pub struct ValidPackage {
    pub metadata: PackageMetadata,
    pub dir: PathBuf,
    pub alias_file: PathBuf,
}

/// Read-only view over `registry/registry/`.
#[derive(Debug, Clone)]
pub struct Registry {
    content_dir: PathBuf,
}

impl Registry {
    pub fn new(layout: &StateLayout) -> Self {
        Self {
            content_dir: layout.registry_content_dir(),
        }
    }

    /// Directory of `name`, if it exists.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidName`] for names that are not a single path component,
    /// [`Error::PackageNotFound`] if there is no such directory.
    pub fn package_path(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        let path = self.content_dir.join(name);
        if path.is_dir() {
            Ok(path)
        } else {
            Err(Error::PackageNotFound {
                name: name.to_string(),
            })
        }
    }

    /// Package names in the registry, sorted.
    ///
    /// A missing content directory yields an empty list.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.content_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ah_fs::Error::io(&self.content_dir, e).into()),
        };

        let mut names: Vec<String> = entries
            .flatten()
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| !name.starts_with('.'))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Load the descriptor and check the alias file is present.
    ///
    /// Any structural problem is reported as [`Error::InvalidPackage`] naming
    /// the offending file.
    pub fn validate(&self, name: &str) -> Result<ValidPackage> {
        let dir = self.package_path(name)?;
        let metadata = PackageMetadata::load(&dir)
            .map_err(|e| Error::invalid_package(name, &dir, e.to_string()))?;

        let alias_file = dir.join(ALIAS_FILENAME);
        if !alias_file.is_file() {
            return Err(Error::invalid_package(
                name,
                &alias_file,
                format!("'{ALIAS_FILENAME}' is missing"),
            ));
        }

        Ok(ValidPackage {
            metadata,
            dir,
            alias_file,
        })
    }

    /// Directory name and metadata of every package whose descriptor loads,
    /// in name order. Broken packages are skipped.
    pub fn packages(&self) -> Result<Vec<(String, PackageMetadata)>> {
        let mut packages = Vec::new();
        for name in self.list()? {
            match PackageMetadata::load(&self.content_dir.join(&name)) {
                Ok(meta) => packages.push((name, meta)),
                Err(e) => {
                    tracing::debug!(package = %name, error = %e, "Skipping unreadable package")
                }
            }
        }
        Ok(packages)
    }
}

/// Reject names that would escape the content or active directory.
pub fn validate_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name.contains('/') || name.contains('\\') {
        Some("name must not contain path separators")
    } else if name == ".." || name.starts_with('.') {
        Some("name must not start with '.'")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::InvalidName {
            name: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ah_test_utils::TestState;
    use rstest::rstest;

    #[test]
    fn list_is_sorted_and_skips_hidden() {
        let state = TestState::new();
        state.add_package("zsh", &[("z", "zsh")]);
        state.add_package("docker", &[("d", "docker")]);
        fs::create_dir_all(state.layout().registry_content_dir().join(".git")).unwrap();
        fs::write(state.layout().registry_content_dir().join("README.md"), "x").unwrap();

        let registry = Registry::new(&state.layout());
        assert_eq!(registry.list().unwrap(), vec!["docker", "zsh"]);
    }

    #[test]
    fn missing_content_dir_lists_empty() {
        let state = TestState::empty();
        let registry = Registry::new(&state.layout());
        assert!(registry.list().unwrap().is_empty());
    }

    #[test]
    fn unknown_package_is_not_found() {
        let state = TestState::new();
        let registry = Registry::new(&state.layout());
        assert!(matches!(
            registry.package_path("nope"),
            Err(Error::PackageNotFound { .. })
        ));
    }

    #[test]
    fn missing_alias_file_is_invalid() {
        let state = TestState::new();
        state.add_raw_package("half", Some("name: half\nversion: 1.0.0\n"), None);

        let err = Registry::new(&state.layout()).validate("half").unwrap_err();
        match err {
            Error::InvalidPackage { name, path, .. } => {
                assert_eq!(name, "half");
                assert!(path.ends_with(ALIAS_FILENAME));
            }
            other => panic!("expected InvalidPackage, got {other:?}"),
        }
    }

    #[test]
    fn missing_descriptor_is_invalid() {
        let state = TestState::new();
        state.add_raw_package("bare", None, Some("alias b='true'\n"));

        let err = Registry::new(&state.layout()).validate("bare").unwrap_err();
        assert!(matches!(err, Error::InvalidPackage { .. }));
    }

    #[test]
    fn packages_skips_broken_descriptors() {
        let state = TestState::new();
        state.add_package("git", &[("gs", "git status")]);
        state.add_raw_package("broken", Some("name: [\n"), Some(""));

        let names: Vec<String> = Registry::new(&state.layout())
            .packages()
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["git"]);
    }

    #[rstest]
    #[case("")]
    #[case("..")]
    #[case(".hidden")]
    #[case("a/b")]
    #[case("a\\b")]
    fn bad_names_are_rejected(#[case] name: &str) {
        assert!(matches!(validate_name(name), Err(Error::InvalidName { .. })));
    }

    #[test]
    fn plain_names_pass() {
        assert!(validate_name("git-extras_2").is_ok());
    }
}
