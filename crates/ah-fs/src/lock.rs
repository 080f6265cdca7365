//! Exclusive state lock
//!
//! A single advisory file lock keyed by the state root serializes every
//! read-then-write of the active set and the registry cache, across threads
//! and across separate processes. The lock is released when the guard is
//! dropped, so early returns, errors, and unwinding panics all release it.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use backoff::ExponentialBackoffBuilder;
use fs2::FileExt;

use crate::{Error, Result, StateLayout};

/// Tuning for blocking lock acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockConfig {
    /// Give up and report [`Error::LockFailed`] after this long.
    pub timeout: Duration,
    /// First retry delay; later delays grow exponentially.
    pub poll_interval: Duration,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(10),
        }
    }
}

impl LockConfig {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }
}

/// Named mutual-exclusion resource over one state root.
#[derive(Debug, Clone)]
pub struct StateLock {
    path: PathBuf,
    config: LockConfig,
}

impl StateLock {
    pub fn new(layout: &StateLayout, config: LockConfig) -> Self {
        Self {
            path: layout.lock_file(),
            config,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Block until the lock is held or `config.timeout` elapses.
    pub fn acquire(&self) -> Result<StateLockGuard> {
        let file = self.open()?;
        let started = Instant::now();

        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.config.poll_interval)
            .with_max_interval(Duration::from_millis(250))
            .with_max_elapsed_time(Some(self.config.timeout))
            .build();

        let attempt = || match file.try_lock_exclusive() {
            Ok(()) => Ok(()),
            Err(e) if is_contended(&e) => {
                tracing::debug!(path = ?self.path, "State lock busy, retrying");
                Err(backoff::Error::transient(e))
            }
            Err(e) => Err(backoff::Error::permanent(e)),
        };

        match backoff::retry(policy, attempt) {
            Ok(()) => {
                tracing::debug!(
                    path = ?self.path,
                    waited = ?started.elapsed(),
                    "State lock acquired"
                );
                Ok(StateLockGuard {
                    file,
                    path: self.path.clone(),
                })
            }
            Err(backoff::Error::Permanent(e)) => Err(Error::io(&self.path, e)),
            Err(backoff::Error::Transient { .. }) => Err(Error::LockFailed {
                path: self.path.clone(),
                waited_ms: started.elapsed().as_millis(),
            }),
        }
    }

    /// Take the lock only if nobody else holds it.
    pub fn try_acquire(&self) -> Result<Option<StateLockGuard>> {
        let file = self.open()?;
        match file.try_lock_exclusive() {
            Ok(()) => {
                tracing::debug!(path = ?self.path, "State lock acquired");
                Ok(Some(StateLockGuard {
                    file,
                    path: self.path.clone(),
                }))
            }
            Err(e) if is_contended(&e) => Ok(None),
            Err(e) => Err(Error::io(&self.path, e)),
        }
    }

    fn open(&self) -> Result<File> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| Error::io(&self.path, e))
    }
}

fn is_contended(err: &io::Error) -> bool {
    err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
        || err.kind() == io::ErrorKind::WouldBlock
}

/// Proof that the state lock is held. Dropping it releases the lock.
#[derive(Debug)]
pub struct StateLockGuard {
    file: File,
    path: PathBuf,
}

impl StateLockGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StateLockGuard {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(path = ?self.path, "Failed to release state lock: {}", e);
        } else {
            tracing::debug!(path = ?self.path, "State lock released");
        }
    }
}

/// Run `op` while holding the state lock for `layout`.
///
/// The error type of `op` only needs to absorb [`Error`], so callers in
/// higher layers can pass closures returning their own error enums.
pub fn with_lock<T, E, F>(
    layout: &StateLayout,
    config: &LockConfig,
    op: F,
) -> std::result::Result<T, E>
where
    F: FnOnce() -> std::result::Result<T, E>,
    E: From<Error>,
{
    let _guard = StateLock::new(layout, *config).acquire()?;
    op()
}
