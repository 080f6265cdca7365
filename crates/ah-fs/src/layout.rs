//! State-root layout
//!
//! ```text
//! <root>/
//!   active/<package>        -> link into registry/registry/<package>
//!   registry/               local clone of the shared package collection
//!     registry/<package>/   ah.yaml + alias.sh
//!   bin/
//!   env.sh                  sourced by the shell profile
//!   aliases.sh              compiled alias file, sourced by env.sh
//!   .lock                   advisory lock resource
//!   .last_modified          timestamp marker for health checks
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Well-known entries inside the state root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatePath {
    /// One link per enabled package
    ActiveDir,
    /// Local clone of the registry repository
    RegistryDir,
    /// Directory inside the clone holding one subdirectory per package
    RegistryContentDir,
    /// Helper binaries directory, prepended to PATH by `env.sh`
    BinDir,
    /// Init script sourced from the shell profile
    EnvFile,
    /// Compiled alias file
    AliasFile,
    /// Advisory lock file
    LockFile,
    /// Last-modified timestamp marker
    Timestamp,
}

impl StatePath {
    /// Path relative to the state root.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ActiveDir => "active",
            Self::RegistryDir => "registry",
            Self::RegistryContentDir => "registry/registry",
            Self::BinDir => "bin",
            Self::EnvFile => "env.sh",
            Self::AliasFile => "aliases.sh",
            Self::LockFile => ".lock",
            Self::Timestamp => ".last_modified",
        }
    }
}

impl AsRef<Path> for StatePath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl std::fmt::Display for StatePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolved paths for one state root.
///
/// The root is always injected, never discovered from process-wide state,
/// so tests can point a layout at an isolated temporary directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateLayout {
    root: PathBuf,
}

impl StateLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a well-known entry.
    pub fn path(&self, entry: StatePath) -> PathBuf {
        self.root.join(entry)
    }

    pub fn active_dir(&self) -> PathBuf {
        self.path(StatePath::ActiveDir)
    }

    pub fn active_entry(&self, package: &str) -> PathBuf {
        self.active_dir().join(package)
    }

    pub fn registry_dir(&self) -> PathBuf {
        self.path(StatePath::RegistryDir)
    }

    pub fn registry_content_dir(&self) -> PathBuf {
        self.path(StatePath::RegistryContentDir)
    }

    pub fn registry_entry(&self, package: &str) -> PathBuf {
        self.registry_content_dir().join(package)
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.path(StatePath::BinDir)
    }

    pub fn env_file(&self) -> PathBuf {
        self.path(StatePath::EnvFile)
    }

    pub fn alias_file(&self) -> PathBuf {
        self.path(StatePath::AliasFile)
    }

    pub fn lock_file(&self) -> PathBuf {
        self.path(StatePath::LockFile)
    }

    pub fn timestamp_file(&self) -> PathBuf {
        self.path(StatePath::Timestamp)
    }

    /// Create the root, `active/`, and `bin/` directories if missing.
    ///
    /// The registry directory is left to the transport, which distinguishes
    /// "clone" from "pull" by its presence.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [self.root.clone(), self.active_dir(), self.bin_dir()] {
            fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
        }
        Ok(())
    }
}
