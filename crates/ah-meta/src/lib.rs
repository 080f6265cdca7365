//! Package metadata for Alias Hub
//!
//! A package is a directory holding two files:
//!
//! ```text
//! <package>/
//!   ah.yaml    descriptor: name, version, description, author, website
//!   alias.sh   alias definitions, one `alias name='command'` per line
//! ```
//!
//! This crate reads both. It never writes and never locks.

pub mod error;
pub mod metadata;
pub mod parser;

/// Descriptor file at the root of every package.
pub const DESCRIPTOR_FILENAME: &str = "ah.yaml";

/// Alias definition file at the root of every package.
pub const ALIAS_FILENAME: &str = "alias.sh";

pub use error::{Error, Result};
pub use metadata::PackageMetadata;
pub use parser::{AliasDef, is_valid_alias_name, parse_alias_line, parse_aliases};
