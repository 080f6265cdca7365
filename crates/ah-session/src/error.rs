//! Error types for the resolution session

use thiserror::Error;

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Error from the lifecycle engine
    #[error(transparent)]
    Core(#[from] ah_core::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A recognized action this version cannot perform
    #[error("action '{action}' is not supported in this version")]
    UnsupportedAction { action: String },

    #[error("unknown action: '{action}'")]
    UnknownAction { action: String },

    /// Well-formed request that does not fit this session
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// Malformed HTTP framing
    #[error("malformed request: {message}")]
    BadRequest { message: String },

    #[error("session server must bind to a loopback address, got {addr}")]
    NotLoopback { addr: std::net::SocketAddr },

    #[error("session task failed: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status the session endpoint answers with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UnsupportedAction { .. }
            | Self::UnknownAction { .. }
            | Self::InvalidRequest { .. }
            | Self::BadRequest { .. }
            | Self::Json(_) => 400,
            _ => 500,
        }
    }
}
