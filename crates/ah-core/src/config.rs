//! Engine configuration
//!
//! Resolution order for each setting: explicit builder call, then
//! environment variable, then default.
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `AH_ROOT` | state root | `$HOME/.ah` |
//! | `AH_REGISTRY_URL` | registry clone URL | [`DEFAULT_REGISTRY_URL`] |
//! | `AH_OFFLINE` | skip registry transport | unset |
//! | `AH_LOCK_TIMEOUT_SECS` | lock wait ceiling | 30 |

use std::path::{Path, PathBuf};
use std::time::Duration;

use ah_fs::{LockConfig, StateLayout};

use crate::{Error, Result};

/// Directory name of the state root under the home directory.
pub const ROOT_DIR_NAME: &str = ".ah";

/// Repository whose `registry/` directory holds the shared packages.
pub const DEFAULT_REGISTRY_URL: &str = "https://github.com/sarkartanmay393/ah.git";

/// Ceiling for one registry clone/pull.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything the lifecycle engine needs to know about its environment.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub root: PathBuf,
    pub registry_url: String,
    pub fetch_timeout: Duration,
    pub lock: LockConfig,
    /// When set, registry refresh is a logged no-op and cached data is used.
    pub offline: bool,
}

impl EngineConfig {
    /// Configuration for an explicit state root with default settings.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            lock: LockConfig::default(),
            offline: false,
        }
    }

    /// Build from `AH_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no root is given and the home directory
    /// cannot be determined, or if a numeric variable does not parse.
    pub fn from_env() -> Result<Self> {
        let root = match std::env::var_os("AH_ROOT") {
            Some(root) if !root.is_empty() => PathBuf::from(root),
            _ => default_root()?,
        };
        let mut config = Self::new(root);

        if let Ok(url) = std::env::var("AH_REGISTRY_URL")
            && !url.trim().is_empty()
        {
            config.registry_url = url.trim().to_string();
        }

        if let Ok(value) = std::env::var("AH_OFFLINE") {
            config.offline = is_truthy(&value);
        }

        if let Ok(value) = std::env::var("AH_LOCK_TIMEOUT_SECS") {
            let secs: u64 = value.trim().parse().map_err(|_| Error::Config {
                message: format!("AH_LOCK_TIMEOUT_SECS must be a whole number, got '{value}'"),
            })?;
            config.lock.timeout = Duration::from_secs(secs);
        }

        tracing::debug!(root = ?config.root, offline = config.offline, "Resolved engine config");
        Ok(config)
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_registry_url(mut self, url: impl Into<String>) -> Self {
        self.registry_url = url.into();
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock.timeout = timeout;
        self
    }

    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn layout(&self) -> StateLayout {
        StateLayout::new(&self.root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// `$HOME/.ah`
pub fn default_root() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(ROOT_DIR_NAME))
        .ok_or_else(|| Error::Config {
            message: "could not determine home directory; set AH_ROOT".to_string(),
        })
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
