//! Resolution session state
//!
//! A session is created for one candidate package whose install found
//! conflicts. The conflict list is computed once at start and never
//! refreshed. Each decision takes the state lock on its own, through the
//! lifecycle manager, so nothing is held while a human decides.

use std::sync::Arc;

use ah_core::{Conflict, PackageManager};

use crate::protocol::{Decision, ResolveAction, ResolveOutcome, ResolveRequest, SessionSummary};
use crate::{Error, Result};

#[derive(Debug)]
pub struct ResolutionSession {
    manager: Arc<PackageManager>,
    package: String,
    version: String,
    alias_count: usize,
    conflicts: Vec<Conflict>,
    decisions: Vec<Decision>,
}

impl ResolutionSession {
    /// Freeze the conflict list of `candidate` against the current active set.
    pub fn start(manager: Arc<PackageManager>, candidate: &str) -> Result<Self> {
        let preview = manager.preview(candidate)?;
        let conflicts = manager.conflicts(candidate)?;
        tracing::info!(
            package = candidate,
            conflicts = conflicts.len(),
            "Resolution session started"
        );

        Ok(Self {
            manager,
            package: candidate.to_string(),
            version: preview.metadata.version,
            alias_count: preview.aliases.len(),
            conflicts,
            decisions: Vec::new(),
        })
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// The snapshot taken at start.
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    /// Conflicts with no decision yet.
    pub fn pending(&self) -> Vec<&Conflict> {
        self.conflicts
            .iter()
            .filter(|c| !self.decisions.iter().any(|d| d.alias == c.alias))
            .collect()
    }

    /// Apply one decision.
    ///
    /// `replace` enables the whole candidate package, so its other aliases
    /// may now shadow or be shadowed by other active packages.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownAction`] / [`Error::UnsupportedAction`] for actions
    ///   that are not `keep_existing` or `replace`
    /// - [`Error::InvalidRequest`] for an alias outside the snapshot or a
    ///   replace target other than the candidate
    /// - [`Error::Core`] if enabling fails
    pub fn resolve(&mut self, request: ResolveRequest) -> Result<ResolveOutcome> {
        let action = ResolveAction::parse(&request.action)?;

        let outcome = match action {
            ResolveAction::Rename => {
                return Err(Error::UnsupportedAction {
                    action: request.action,
                });
            }
            ResolveAction::KeepExisting => {
                self.ensure_in_snapshot(&request.alias)?;
                tracing::info!(alias = %request.alias, "Kept existing alias owner");
                ResolveOutcome::Kept {
                    alias: request.alias.clone(),
                }
            }
            ResolveAction::Replace => {
                self.ensure_in_snapshot(&request.alias)?;
                if !request.target_package.is_empty() && request.target_package != self.package {
                    return Err(Error::InvalidRequest {
                        message: format!(
                            "replace target must be '{}', got '{}'",
                            self.package, request.target_package
                        ),
                    });
                }
                self.manager.enable(&self.package)?;
                tracing::info!(
                    alias = %request.alias,
                    package = %self.package,
                    "Switched alias to candidate"
                );
                ResolveOutcome::Replaced {
                    alias: request.alias.clone(),
                    package: self.package.clone(),
                }
            }
        };

        self.decisions.retain(|d| d.alias != request.alias);
        self.decisions.push(Decision {
            alias: request.alias,
            action,
        });
        Ok(outcome)
    }

    fn ensure_in_snapshot(&self, alias: &str) -> Result<()> {
        if self.conflicts.iter().any(|c| c.alias == alias) {
            Ok(())
        } else {
            Err(Error::InvalidRequest {
                message: format!("'{alias}' is not a conflict in this session"),
            })
        }
    }

    /// End the session: one final recompile under the lock, then the summary.
    ///
    /// A compile failure is logged, not returned.
    pub fn finish(self) -> Result<SessionSummary> {
        match self.manager.recompile() {
            Ok(report) => {
                tracing::debug!(aliases = report.aliases, "Final recompile done");
            }
            Err(e @ ah_core::Error::CompileFailed { .. }) => {
                tracing::warn!(error = %e, "Final recompile failed");
            }
            Err(e) => return Err(e.into()),
        }

        let unresolved = self.pending().len();
        tracing::info!(
            package = %self.package,
            decisions = self.decisions.len(),
            unresolved,
            "Resolution session ended"
        );
        Ok(SessionSummary {
            package: self.package,
            version: self.version,
            alias_count: self.alias_count,
            decisions: self.decisions,
            unresolved,
        })
    }
}
