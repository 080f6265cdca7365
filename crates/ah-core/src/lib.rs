//! Package lifecycle and conflict-resolution engine for Alias Hub
//!
//! `ah-core` turns the primitives of `ah-fs` and `ah-meta` into the
//! operations the tool exposes:
//!
//! - **Registry**: read-only view of the local registry clone, plus the
//!   transport that refreshes it
//! - **Active set**: the `active/` directory of links, one per enabled package
//! - **Compiler**: regenerates the single shell-sourced alias file
//! - **Conflict detector**: alias-name collisions between a candidate and
//!   the active set
//! - **Package manager**: install/enable/disable/remove/list/search/update,
//!   with every mutation inside the state lock
//! - **Doctor**: health checks over a state root
//!
//! # Architecture
//!
//! ```text
//!              ah-cli / ah-session
//!                      |
//!                   ah-core
//!                      |
//!             +--------+--------+
//!             |                 |
//!           ah-fs            ah-meta
//! ```

pub mod active;
pub mod compiler;
pub mod config;
pub mod conflict;
pub mod doctor;
pub mod env;
pub mod error;
pub mod manager;
pub mod registry;

pub use active::ActiveSet;
pub use compiler::{CompileReport, compile, shell_quote};
pub use config::{DEFAULT_REGISTRY_URL, EngineConfig};
pub use conflict::{Conflict, ConflictDetector, PackageRef};
pub use doctor::{CheckStatus, HealthCheck};
pub use error::{Error, Result};
pub use manager::{
    InstallOutcome, InstallPreview, PackageListing, PackageManager, PackageStatus, UpdateReport,
};
pub use registry::{
    FetchOutcome, GitTransport, OfflineTransport, Registry, RegistryTransport, ValidPackage,
};

pub use ah_fs::{LockConfig, StateLayout};
pub use ah_meta::{AliasDef, PackageMetadata};
