//! Error types for ah-core

use std::path::PathBuf;

use crate::conflict::Conflict;

/// Result type for ah-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in package lifecycle operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No directory for this package in the registry content dir
    #[error("package '{name}' not found in registry")]
    PackageNotFound { name: String },

    /// Descriptor or alias file missing or corrupt
    #[error("invalid package '{name}': {reason} ({path})")]
    InvalidPackage {
        name: String,
        path: PathBuf,
        reason: String,
    },

    /// Package names are single path components
    #[error("invalid package name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("package '{name}' is already enabled")]
    AlreadyEnabled { name: String },

    #[error("package '{name}' is not enabled")]
    NotEnabled { name: String },

    /// Control-flow signal: the candidate collides with active packages
    #[error("conflicts detected: {} aliases collide", .conflicts.len())]
    ConflictDetected {
        package: String,
        conflicts: Vec<Conflict>,
    },

    #[error("state lock at {path} is unavailable (waited {waited_ms}ms)")]
    LockUnavailable { path: PathBuf, waited_ms: u128 },

    /// Non-fatal wherever it follows a successful link mutation
    #[error("failed to compile aliases: {reason}")]
    CompileFailed { reason: String },

    /// Non-fatal during refresh, fatal for an explicit update
    #[error("registry transport failed: {reason}")]
    TransportFailed { reason: String },

    #[error("configuration error: {message}")]
    Config { message: String },

    /// Filesystem error from ah-fs
    #[error(transparent)]
    Fs(ah_fs::Error),

    /// Package file error from ah-meta
    #[error(transparent)]
    Meta(#[from] ah_meta::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<ah_fs::Error> for Error {
    fn from(err: ah_fs::Error) -> Self {
        match err {
            ah_fs::Error::LockFailed { path, waited_ms } => {
                Self::LockUnavailable { path, waited_ms }
            }
            other => Self::Fs(other),
        }
    }
}

impl Error {
    pub fn invalid_package(
        name: &str,
        path: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidPackage {
            name: name.to_string(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Conflicts are a routing signal, not a failure.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ConflictDetected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::PackageRef;

    #[test]
    fn conflict_message_counts_aliases() {
        let conflict = |alias: &str| Conflict {
            alias: alias.to_string(),
            existing: PackageRef::new("package1", "ls"),
            new: PackageRef::new("package2", "ls -a"),
        };
        let err = Error::ConflictDetected {
            package: "package2".into(),
            conflicts: vec![conflict("ll"), conflict("gs")],
        };
        assert_eq!(err.to_string(), "conflicts detected: 2 aliases collide");
        assert!(err.is_conflict());
    }

    #[test]
    fn lock_failure_maps_to_lock_unavailable() {
        let err: Error = ah_fs::Error::LockFailed {
            path: PathBuf::from("/root/.ah/.lock"),
            waited_ms: 30_000,
        }
        .into();
        assert!(matches!(err, Error::LockUnavailable { .. }));
        assert!(err.to_string().contains(".lock"));
    }

    #[test]
    fn invalid_package_names_file() {
        let err = Error::invalid_package("git", "/r/git/alias.sh", "'alias.sh' missing");
        let display = err.to_string();
        assert!(display.contains("git"));
        assert!(display.contains("alias.sh"));
    }
}
