//! Package lifecycle manager
//!
//! Every operation that changes the active set or the registry clone runs
//! inside the state lock, and every change to the active set is followed by
//! a recompile and a timestamp update. Read-only operations never lock.
//!
//! ```text
//! install ──► refresh (soft) ──► validate ──► conflicts? ──► Ready | Conflicts
//!                                                              │
//!            enable_checked / enable ◄────── caller decides ◄──┘
//! ```

use std::fs;

use ah_fs::{StateLayout, io::touch_timestamp, with_lock};
use ah_meta::{AliasDef, PackageMetadata, parse_aliases};
use serde::Serialize;

use crate::active::ActiveSet;
use crate::compiler::{CompileReport, compile};
use crate::config::EngineConfig;
use crate::conflict::{Conflict, ConflictDetector};
use crate::env::ensure_env_script;
use crate::registry::{
    FetchOutcome, GitTransport, OfflineTransport, Registry, RegistryTransport, validate_name,
};
use crate::{Error, Result};

/// What the operator sees before agreeing to enable a package.
#[derive(Debug, Clone, Serialize)]
pub struct InstallPreview {
    pub metadata: PackageMetadata,
    pub aliases: Vec<AliasDef>,
}

/// Result of [`PackageManager::install`]. Neither variant has mutated the
/// active set.
#[derive(Debug, Clone)]
pub enum InstallOutcome {
    /// No collisions; the caller may enable.
    Ready { preview: InstallPreview },
    /// Collisions with the active set; the caller picks a resolution path.
    Conflicts {
        preview: InstallPreview,
        conflicts: Vec<Conflict>,
    },
}

impl InstallOutcome {
    pub fn preview(&self) -> &InstallPreview {
        match self {
            Self::Ready { preview } | Self::Conflicts { preview, .. } => preview,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PackageStatus {
    Enabled,
    Available,
}

impl std::fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enabled => write!(f, "Enabled"),
            Self::Available => write!(f, "Available"),
        }
    }
}

/// One row of `list` or `search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageListing {
    pub name: String,
    pub status: PackageStatus,
    pub description: String,
}

/// Result of an explicit registry update.
#[derive(Debug, Clone)]
pub struct UpdateReport {
    pub fetch: FetchOutcome,
    /// `None` if the recompile failed (already logged).
    pub compile: Option<CompileReport>,
}

/// Orchestrates the package lifecycle over one state root.
pub struct PackageManager {
    config: EngineConfig,
    layout: StateLayout,
    registry: Registry,
    active: ActiveSet,
    transport: Box<dyn RegistryTransport>,
}

impl std::fmt::Debug for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageManager")
            .field("root", &self.config.root)
            .field("offline", &self.config.offline)
            .finish()
    }
}

impl PackageManager {
    /// Manager using `git` for the registry, or no transport when offline.
    pub fn new(config: EngineConfig) -> Self {
        let transport: Box<dyn RegistryTransport> = if config.offline {
            Box::new(OfflineTransport)
        } else {
            Box::new(GitTransport::new())
        };
        Self::with_transport(config, transport)
    }

    pub fn with_transport(config: EngineConfig, transport: Box<dyn RegistryTransport>) -> Self {
        let layout = config.layout();
        Self {
            registry: Registry::new(&layout),
            active: ActiveSet::new(&layout),
            layout,
            config,
            transport,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn layout(&self) -> &StateLayout {
        &self.layout
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn active(&self) -> &ActiveSet {
        &self.active
    }

    fn locked<T>(&self, op: impl FnOnce() -> Result<T>) -> Result<T> {
        with_lock(&self.layout, &self.config.lock, op)
    }

    /// Create the state directories and `env.sh` if missing.
    pub fn ensure_dirs(&self) -> Result<()> {
        self.layout.ensure_dirs()?;
        ensure_env_script(&self.layout)?;
        Ok(())
    }

    /// Refresh the registry clone under the lock. Transport failures are
    /// logged and reported as [`FetchOutcome::Stale`].
    pub fn refresh(&self) -> Result<FetchOutcome> {
        self.ensure_dirs()?;
        self.locked(|| Ok(self.refresh_locked()))
    }

    fn refresh_locked(&self) -> FetchOutcome {
        match self.fetch_locked() {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, "Registry refresh failed; using cached data");
                FetchOutcome::Stale
            }
        }
    }

    fn fetch_locked(&self) -> Result<FetchOutcome> {
        self.transport.fetch(
            &self.layout.registry_dir(),
            &self.config.registry_url,
            self.config.fetch_timeout,
        )
    }

    /// Look a package up and compute its conflicts without mutating the
    /// active set.
    ///
    /// # Errors
    ///
    /// [`Error::PackageNotFound`], [`Error::InvalidPackage`], or a lock or
    /// filesystem error.
    pub fn install(&self, name: &str) -> Result<InstallOutcome> {
        self.ensure_dirs()?;
        self.locked(|| {
            self.refresh_locked();
            let preview = self.preview(name)?;
            let conflicts = self.conflicts(name)?;

            if conflicts.is_empty() {
                tracing::info!(package = name, "Package ready to enable");
                Ok(InstallOutcome::Ready { preview })
            } else {
                tracing::info!(
                    package = name,
                    conflicts = conflicts.len(),
                    "Package conflicts with active set"
                );
                Ok(InstallOutcome::Conflicts { preview, conflicts })
            }
        })
    }

    /// Metadata and aliases of a registry package. No lock.
    pub fn preview(&self, name: &str) -> Result<InstallPreview> {
        let package = self.registry.validate(name)?;
        let aliases = parse_aliases(&package.alias_file)
            .map_err(|e| Error::invalid_package(name, &package.alias_file, e.to_string()))?;
        Ok(InstallPreview {
            metadata: package.metadata,
            aliases,
        })
    }

    /// Conflicts between `name` and the current active set. No lock.
    pub fn conflicts(&self, name: &str) -> Result<Vec<Conflict>> {
        let package = self.registry.validate(name)?;
        ConflictDetector::new(&self.layout).detail(name, &package.dir)
    }

    /// Link `name` into the active set, replacing any existing link, and
    /// recompile.
    pub fn enable(&self, name: &str) -> Result<()> {
        self.locked(|| self.enable_locked(name))
    }

    /// Like [`enable`](Self::enable), but re-checks conflicts inside the lock
    /// and refuses with [`Error::ConflictDetected`] if the active set changed
    /// since the preview.
    pub fn enable_checked(&self, name: &str) -> Result<()> {
        self.locked(|| {
            let conflicts = self.conflicts(name)?;
            if !conflicts.is_empty() {
                return Err(Error::ConflictDetected {
                    package: name.to_string(),
                    conflicts,
                });
            }
            self.enable_locked(name)
        })
    }

    /// Enable a package that is not enabled yet.
    pub fn enable_fresh(&self, name: &str) -> Result<()> {
        self.locked(|| {
            if self.active.contains(name) {
                return Err(Error::AlreadyEnabled {
                    name: name.to_string(),
                });
            }
            self.enable_locked(name)
        })
    }

    fn enable_locked(&self, name: &str) -> Result<()> {
        let package = self.registry.validate(name)?;
        self.active.link(name, &package.dir)?;
        tracing::info!(package = name, "Enabled package");
        self.after_mutation();
        Ok(())
    }

    /// Remove the active link of `name`.
    pub fn disable(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        self.locked(|| {
            if !self.active.unlink(name)? {
                return Err(Error::NotEnabled {
                    name: name.to_string(),
                });
            }
            tracing::info!(package = name, "Disabled package");
            self.after_mutation();
            Ok(())
        })
    }

    /// Remove `name` from the active set. The registry copy stays. A package
    /// that was not enabled is not an error; returns whether a link existed.
    pub fn remove(&self, name: &str) -> Result<bool> {
        validate_name(name)?;
        self.locked(|| {
            let removed = self.active.unlink(name)?;
            if removed {
                tracing::info!(package = name, "Removed package");
            } else {
                tracing::debug!(package = name, "Remove: package was not enabled");
            }
            self.after_mutation();
            Ok(removed)
        })
    }

    /// Recompile and stamp. Neither failure undoes the mutation before it.
    fn after_mutation(&self) {
        if let Err(e) = compile(&self.layout) {
            tracing::warn!(error = %e, "Failed to compile aliases");
        }
        if let Err(e) = touch_timestamp(&self.layout.timestamp_file()) {
            tracing::warn!(error = %e, "Failed to update state timestamp");
        }
    }

    /// Enabled packages, or with `all` every registry package too. No lock.
    ///
    /// Registry packages whose descriptor does not load are left out of the
    /// `all` view; active packages are always listed.
    pub fn list(&self, all: bool) -> Result<Vec<PackageListing>> {
        let mut rows: Vec<PackageListing> = self
            .active
            .list()?
            .into_iter()
            .map(|name| {
                let description = self
                    .active
                    .resolve(&name)
                    .and_then(|dir| PackageMetadata::load(&dir).ok())
                    .map(|m| m.description)
                    .unwrap_or_default();
                PackageListing {
                    name,
                    status: PackageStatus::Enabled,
                    description,
                }
            })
            .collect();

        if all {
            for (name, meta) in self.registry.packages()? {
                if self.active.contains(&name) {
                    continue;
                }
                rows.push(PackageListing {
                    name,
                    status: PackageStatus::Available,
                    description: meta.description,
                });
            }
            rows.sort_by(|a, b| a.name.cmp(&b.name));
        }

        Ok(rows)
    }

    /// Refresh the registry, then match `query` against name and
    /// description. Unreadable packages are skipped.
    pub fn search(&self, query: &str) -> Result<Vec<PackageListing>> {
        self.refresh()?;

        let needle = query.to_lowercase();
        let mut hits = Vec::new();
        for (name, meta) in self.registry.packages()? {
            if name.to_lowercase().contains(&needle) || meta.matches(query) {
                let status = if self.active.contains(&name) {
                    PackageStatus::Enabled
                } else {
                    PackageStatus::Available
                };
                hits.push(PackageListing {
                    name,
                    status,
                    description: meta.description,
                });
            }
        }
        Ok(hits)
    }

    /// Explicit update: fetch failures are returned, not downgraded.
    pub fn update(&self) -> Result<UpdateReport> {
        self.ensure_dirs()?;
        self.locked(|| {
            let fetch = self.fetch_locked()?;
            let compile = match compile(&self.layout) {
                Ok(report) => Some(report),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to compile aliases");
                    None
                }
            };
            tracing::info!(?fetch, "Registry updated");
            Ok(UpdateReport { fetch, compile })
        })
    }

    /// Regenerate the compiled alias file under the lock.
    pub fn recompile(&self) -> Result<CompileReport> {
        self.locked(|| compile(&self.layout))
    }

    /// Delete the whole state root.
    ///
    /// Everything except the lock file is removed while the lock is held, so
    /// no concurrent mutation can interleave. The lock file and the root go
    /// once the lock is released. A missing root is a no-op.
    pub fn purge(&self) -> Result<()> {
        let root = self.layout.root();
        if !root.exists() {
            return Ok(());
        }

        let lock_file = self.layout.lock_file();
        self.locked(|| {
            let entries = fs::read_dir(root).map_err(|e| ah_fs::Error::io(root, e))?;
            for entry in entries {
                let entry = entry.map_err(|e| ah_fs::Error::io(root, e))?;
                let path = entry.path();
                if path == lock_file {
                    continue;
                }
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                let removed = if is_dir {
                    fs::remove_dir_all(&path)
                } else {
                    fs::remove_file(&path)
                };
                removed.map_err(|e| ah_fs::Error::io(&path, e))?;
            }
            Ok(())
        })?;

        fs::remove_dir_all(root).map_err(|e| ah_fs::Error::io(root, e))?;
        tracing::info!(root = ?root, "Purged state root");
        Ok(())
    }
}
