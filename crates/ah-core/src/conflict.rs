//! Conflict detection
//!
//! Compares a candidate package's alias names against every active package.
//! The index is built in lexicographic package order so that when two active
//! packages define the same alias, the later name owns it. Nothing here
//! mutates state.

use std::collections::BTreeMap;
use std::path::Path;

use ah_fs::StateLayout;
use ah_meta::{ALIAS_FILENAME, AliasDef, parse_aliases};
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::active::ActiveSet;

/// One side of a conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRef {
    pub package: String,
    pub command: String,
}

impl PackageRef {
    pub fn new(package: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            command: command.into(),
        }
    }
}

/// An alias name defined by both an active package and the candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub alias: String,
    pub existing: PackageRef,
    pub new: PackageRef,
}

/// Owner of each alias name across the active set.
type AliasIndex = BTreeMap<String, PackageRef>;

/// Conflict checks against the active set of one state root.
#[derive(Debug, Clone)]
pub struct ConflictDetector {
    active: ActiveSet,
}

impl ConflictDetector {
    pub fn new(layout: &StateLayout) -> Self {
        Self {
            active: ActiveSet::new(layout),
        }
    }

    /// Colliding alias names mapped to the active package that owns each.
    ///
    /// An empty map means the candidate can be enabled without collisions.
    pub fn check(&self, candidate_dir: &Path) -> Result<BTreeMap<String, String>> {
        let exclude = package_name(candidate_dir);
        let index = self.index(exclude.as_deref())?;
        let candidate = parse_aliases(&candidate_dir.join(ALIAS_FILENAME))?;

        Ok(candidate
            .into_iter()
            .filter_map(|alias| {
                index
                    .get(&alias.name)
                    .map(|owner| (alias.name, owner.package.clone()))
            })
            .collect())
    }

    /// Full conflict records for `candidate_name`, one per colliding alias,
    /// sorted by alias name.
    ///
    /// If the candidate defines an alias more than once, its last definition
    /// is reported, matching what the shell would see.
    pub fn detail(&self, candidate_name: &str, candidate_dir: &Path) -> Result<Vec<Conflict>> {
        let index = self.index(Some(candidate_name))?;
        let candidate = parse_aliases(&candidate_dir.join(ALIAS_FILENAME))?;

        let mut by_alias: BTreeMap<String, Conflict> = BTreeMap::new();
        for AliasDef { name, command, .. } in candidate {
            if let Some(owner) = index.get(&name) {
                by_alias.insert(
                    name.clone(),
                    Conflict {
                        alias: name,
                        existing: owner.clone(),
                        new: PackageRef::new(candidate_name, command),
                    },
                );
            }
        }

        tracing::debug!(
            package = candidate_name,
            conflicts = by_alias.len(),
            "Checked conflicts"
        );
        Ok(by_alias.into_values().collect())
    }

    fn index(&self, exclude: Option<&str>) -> Result<AliasIndex> {
        let mut index = AliasIndex::new();
        for name in self.active.list()? {
            if Some(name.as_str()) == exclude {
                continue;
            }
            let Some(dir) = self.active.resolve(&name) else {
                continue;
            };
            let aliases = match parse_aliases(&dir.join(ALIAS_FILENAME)) {
                Ok(aliases) => aliases,
                Err(e) => {
                    tracing::warn!(
                        package = %name,
                        error = %e,
                        "Active package has no readable aliases"
                    );
                    continue;
                }
            };
            for alias in aliases {
                index.insert(alias.name, PackageRef::new(name.as_str(), alias.command));
            }
        }
        Ok(index)
    }
}

fn package_name(dir: &Path) -> Option<String> {
    dir.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
}
