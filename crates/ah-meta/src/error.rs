//! Error types for ah-meta

use std::path::PathBuf;

/// Result type for ah-meta operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading package files
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("descriptor not found: {0}")]
    DescriptorNotFound(PathBuf),

    #[error("descriptor {path} is {size} bytes, limit is {limit}")]
    DescriptorTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("failed to parse descriptor {path}: {message}")]
    DescriptorParse { path: PathBuf, message: String },

    #[error("descriptor {path} is missing required field '{field}'")]
    MissingField { path: PathBuf, field: &'static str },

    #[error("alias file not found: {0}")]
    AliasFileNotFound(PathBuf),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors that mean "the file is not there" rather than "the file is bad".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::DescriptorNotFound(_) | Self::AliasFileNotFound(_))
    }
}
