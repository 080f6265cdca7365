//! Conflict-resolution session for Alias Hub
//!
//! When installing a package collides with the active set, the operator can
//! resolve the collisions from a browser instead of the terminal. This crate
//! provides:
//!
//! - [`ResolutionSession`]: the frozen conflict list and the decisions
//!   applied to it, each going through the lifecycle manager
//! - [`SessionServer`]: a loopback-only JSON endpoint driving one session
//!
//! # Example
//!
//! ```ignore
//! let session = ResolutionSession::start(manager, "pkgB")?;
//! let server = SessionServer::bind(session, "127.0.0.1:0".parse()?).await?;
//! println!("open {}", server.url()?);
//! let summary = server.serve().await?.finish()?;
//! ```

pub mod error;
pub mod http;
pub mod protocol;
pub mod server;
pub mod session;

pub use error::{Error, Result};
pub use protocol::{Decision, ResolveAction, ResolveOutcome, ResolveRequest, SessionSummary};
pub use server::SessionServer;
pub use session::ResolutionSession;
