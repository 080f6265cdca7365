//! Package descriptor (`ah.yaml`)
//!
//! ```yaml
//! name: git
//! version: 1.2.0
//! description: Short git aliases
//! author: Jane Doe
//! website: https://example.com
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{DESCRIPTOR_FILENAME, Error, Result};

/// Descriptors above this size are rejected without being parsed.
pub const MAX_DESCRIPTOR_BYTES: u64 = 64 * 1024;

/// Descriptive metadata of one package. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub website: String,
}

/// On-disk shape; required fields are checked after parsing so the error
/// names the missing field instead of a serde position.
#[derive(Debug, Deserialize)]
struct RawDescriptor {
    name: Option<String>,
    version: Option<serde_yaml::Value>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    website: Option<String>,
}

impl PackageMetadata {
    /// Load the descriptor from a package directory.
    ///
    /// # Errors
    ///
    /// - [`Error::DescriptorNotFound`] if `ah.yaml` is absent
    /// - [`Error::DescriptorTooLarge`] above [`MAX_DESCRIPTOR_BYTES`]
    /// - [`Error::DescriptorParse`] / [`Error::MissingField`] for malformed content
    pub fn load(package_dir: &Path) -> Result<Self> {
        let path = package_dir.join(DESCRIPTOR_FILENAME);

        let meta = match fs::metadata(&path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::DescriptorNotFound(path));
            }
            Err(e) => return Err(Error::io(&path, e)),
        };
        if meta.len() > MAX_DESCRIPTOR_BYTES {
            return Err(Error::DescriptorTooLarge {
                path,
                size: meta.len(),
                limit: MAX_DESCRIPTOR_BYTES,
            });
        }

        let content = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        Self::parse(&content, &path)
    }

    /// Parse descriptor text. `path` is only used in error messages.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let raw: RawDescriptor =
            serde_yaml::from_str(content).map_err(|e| Error::DescriptorParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let name = raw
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Error::MissingField {
                path: path.to_path_buf(),
                field: "name",
            })?;

        // `version: 1.0` parses as a float in YAML; keep its text form.
        let version = match raw.version {
            Some(serde_yaml::Value::String(s)) => s,
            Some(serde_yaml::Value::Number(n)) => n.to_string(),
            _ => {
                return Err(Error::MissingField {
                    path: path.to_path_buf(),
                    field: "version",
                });
            }
        };

        Ok(Self {
            name,
            version,
            description: raw.description.unwrap_or_default(),
            author: raw.author.unwrap_or_default(),
            website: raw.website.unwrap_or_default(),
        })
    }

    /// Case-insensitive substring match against name and description.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
    }
}
