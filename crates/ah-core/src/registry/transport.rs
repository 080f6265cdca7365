//! Registry transport
//!
//! Brings the local registry clone up to date. The engine treats any failure
//! here as soft during a refresh and hard only for an explicit update, so
//! implementations just report what happened.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::{Error, Result};

/// What a fetch did to the local clone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// No clone existed; one was created
    Cloned,
    /// Existing clone was pulled
    Updated,
    /// Transport is disabled; cached data stands
    Skipped,
    /// Transport failed during a soft refresh; cached data stands
    Stale,
}

/// Fetches the shared package collection into `dest`.
pub trait RegistryTransport: Send + Sync {
    /// Clone or update `dest` from `url`, giving up after `timeout`.
    fn fetch(&self, dest: &Path, url: &str, timeout: Duration) -> Result<FetchOutcome>;
}

/// Runs the `git` executable: `clone --depth 1` for a fresh registry,
/// `pull --ff-only` for an existing one.
#[derive(Debug, Clone, Default)]
pub struct GitTransport;

impl GitTransport {
    pub fn new() -> Self {
        Self
    }
}

impl RegistryTransport for GitTransport {
    fn fetch(&self, dest: &Path, url: &str, timeout: Duration) -> Result<FetchOutcome> {
        if dest.join(".git").exists() {
            tracing::debug!(dest = ?dest, "Pulling registry");
            let mut cmd = Command::new("git");
            cmd.arg("-C").arg(dest).args(["pull", "--ff-only", "--quiet"]);
            run_bounded(cmd, timeout)?;
            Ok(FetchOutcome::Updated)
        } else {
            tracing::debug!(dest = ?dest, url, "Cloning registry");
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent).map_err(|e| ah_fs::Error::io(parent, e))?;
            }
            let mut cmd = Command::new("git");
            cmd.args(["clone", "--depth", "1", "--quiet", url]).arg(dest);
            run_bounded(cmd, timeout)?;
            Ok(FetchOutcome::Cloned)
        }
    }
}

/// Never touches the network.
#[derive(Debug, Clone, Default)]
pub struct OfflineTransport;

impl RegistryTransport for OfflineTransport {
    fn fetch(&self, dest: &Path, _url: &str, _timeout: Duration) -> Result<FetchOutcome> {
        tracing::debug!(dest = ?dest, "Offline; using cached registry");
        Ok(FetchOutcome::Skipped)
    }
}

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Longest stderr tail carried into an error.
const STDERR_TAIL: usize = 2048;

/// Run `cmd` to completion, killing it once `timeout` has passed.
///
/// Stderr is drained on its own thread so a chatty child never blocks on a
/// full pipe.
fn run_bounded(mut cmd: Command, timeout: Duration) -> Result<()> {
    cmd.env("GIT_TERMINAL_PROMPT", "0")
        .env("SSH_ASKPASS", "/bin/false")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(|e| Error::TransportFailed {
        reason: format!("could not run git: {e}"),
    })?;
    let stderr = drain_stderr(&mut child);

    let started = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) if status.success() => return Ok(()),
            Ok(Some(status)) => {
                let stderr = stderr
                    .and_then(|reader| reader.join().ok())
                    .unwrap_or_default();
                return Err(Error::TransportFailed {
                    reason: format!("git exited with {status}: {}", tail(stderr.trim())),
                });
            }
            Ok(None) if started.elapsed() >= timeout => {
                let _ = child.kill();
                let _ = child.wait();
                // Helpers spawned by git may still hold the pipe; the reader
                // is left to finish on its own.
                return Err(Error::TransportFailed {
                    reason: format!("git timed out after {}s", timeout.as_secs()),
                });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                let _ = child.kill();
                return Err(Error::TransportFailed {
                    reason: format!("failed waiting for git: {e}"),
                });
            }
        }
    }
}

fn drain_stderr(child: &mut Child) -> Option<JoinHandle<String>> {
    let mut pipe = child.stderr.take()?;
    Some(thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }))
}

fn tail(text: &str) -> &str {
    if text.len() <= STDERR_TAIL {
        return text;
    }
    let mut start = text.len() - STDERR_TAIL;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn offline_transport_skips() {
        let temp = TempDir::new().unwrap();
        let outcome = OfflineTransport
            .fetch(temp.path(), "https://example.invalid/repo.git", Duration::from_secs(1))
            .unwrap();
        assert_eq!(outcome, FetchOutcome::Skipped);
    }

    #[cfg(unix)]
    #[test]
    fn slow_command_is_killed() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "sleep 5"]);
        let started = Instant::now();
        let err = run_bounded(cmd, Duration::from_millis(200)).unwrap_err();
        assert!(matches!(err, Error::TransportFailed { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_reports_stderr() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo boom >&2; exit 3"]);
        let err = run_bounded(cmd, Duration::from_secs(5)).unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[cfg(unix)]
    #[test]
    fn large_stderr_does_not_stall_the_child() {
        let mut cmd = Command::new("sh");
        cmd.args([
            "-c",
            "i=0; while [ $i -lt 4000 ]; do echo 'remote: progress padding padding' >&2; \
             i=$((i+1)); done; echo last-line >&2; exit 3",
        ]);
        let started = Instant::now();
        let err = run_bounded(cmd, Duration::from_secs(20)).unwrap_err();
        let reason = err.to_string();
        assert!(reason.contains("exited"), "{reason}");
        assert!(reason.contains("last-line"));
        assert!(reason.len() < STDERR_TAIL + 200);
        assert!(started.elapsed() < Duration::from_secs(20));
    }

    #[test]
    fn tail_keeps_the_end_on_a_char_boundary() {
        let text = format!("{}é{}", "a".repeat(10), "b".repeat(STDERR_TAIL - 1));
        let kept = tail(&text);
        assert!(kept.ends_with('b'));
        assert!(kept.len() <= STDERR_TAIL);
        assert_eq!(tail("short"), "short");
    }

    #[test]
    fn clone_from_missing_source_fails_softly_typed() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("no-such-repo");
        let dest = temp.path().join("registry");
        let result = GitTransport::new().fetch(
            &dest,
            &source.to_string_lossy(),
            Duration::from_secs(10),
        );
        assert!(matches!(result, Err(Error::TransportFailed { .. })));
    }
}
