//! Filesystem layer for Alias Hub
//!
//! Owns the on-disk shape of the state root and the primitives every
//! state-mutating operation is built from:
//!
//! - [`StateLayout`]: where `active/`, `registry/`, the compiled alias file,
//!   the lock file, and the timestamp marker live
//! - [`StateLock`]: the process-crossing advisory lock over the state root
//! - [`io`]: atomic file writes and the last-modified marker
//! - [`link`]: create/remove/inspect the links that make up the active set

pub mod error;
pub mod io;
pub mod layout;
pub mod link;
pub mod lock;

pub use error::{Error, Result};
pub use layout::StateLayout;
pub use lock::{LockConfig, StateLock, StateLockGuard, with_lock};
