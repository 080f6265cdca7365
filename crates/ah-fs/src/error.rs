//! Error types for ah-fs

use std::path::PathBuf;

/// Result type for ah-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in ah-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Lock acquisition failed for {path} after {waited_ms}ms")]
    LockFailed { path: PathBuf, waited_ms: u128 },

    #[error("Link target does not exist: {target}")]
    LinkTargetMissing { target: PathBuf },

    #[error("Refusing to replace non-link entry at {path}")]
    NotALink { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
