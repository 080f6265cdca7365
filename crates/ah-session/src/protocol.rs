//! Session wire types
//!
//! The conflict list is served as `ah_core::Conflict` directly:
//!
//! ```json
//! [{"alias": "ll",
//!   "existing": {"package": "pkgA", "command": "ls -la"},
//!   "new": {"package": "pkgB", "command": "ls -lah"}}]
//! ```

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Body of `POST /api/resolve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest {
    pub alias: String,
    pub action: String,
    #[serde(default)]
    pub target_package: String,
}

impl ResolveRequest {
    pub fn new(alias: &str, action: &str, target_package: &str) -> Self {
        Self {
            alias: alias.to_string(),
            action: action.to_string(),
            target_package: target_package.to_string(),
        }
    }
}

/// A decision kind the session understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveAction {
    KeepExisting,
    Replace,
    Rename,
}

impl ResolveAction {
    /// `rename` may carry the new name as `rename:<name>`.
    pub fn parse(action: &str) -> Result<Self> {
        match action {
            "keep_existing" => Ok(Self::KeepExisting),
            "replace" => Ok(Self::Replace),
            "rename" => Ok(Self::Rename),
            other if other.starts_with("rename:") => Ok(Self::Rename),
            other => Err(Error::UnknownAction {
                action: other.to_string(),
            }),
        }
    }
}

/// A decision that was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub alias: String,
    pub action: ResolveAction,
}

/// What a successful resolve did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ResolveOutcome {
    /// Active package keeps the alias; nothing changed on disk.
    Kept { alias: String },
    /// Candidate package was enabled.
    Replaced { alias: String, package: String },
}

/// Reported to the operator when the session ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub package: String,
    pub version: String,
    /// Aliases the candidate package defines
    pub alias_count: usize,
    pub decisions: Vec<Decision>,
    /// Conflicts the operator never decided
    pub unresolved: usize,
}

impl SessionSummary {
    /// True if any decision enabled the candidate.
    pub fn replaced(&self) -> bool {
        self.decisions
            .iter()
            .any(|d| d.action == ResolveAction::Replace)
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
