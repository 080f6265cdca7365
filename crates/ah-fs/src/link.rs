//! Link primitives for the active set
//!
//! Each enabled package is one link `active/<name>` pointing at its registry
//! directory. Creating or removing that link is the unit of state mutation.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Create `link` pointing at the directory `target`.
///
/// `target` must exist. Any existing link at `link` must be removed first
/// (see [`remove_link`]).
pub fn create_link(target: &Path, link: &Path) -> Result<()> {
    if !target.exists() {
        return Err(Error::LinkTargetMissing {
            target: target.to_path_buf(),
        });
    }
    if let Some(parent) = link.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    symlink_dir(target, link).map_err(|e| Error::io(link, e))
}

/// Remove the link at `link`.
///
/// Returns `Ok(false)` when nothing was there. A real directory at `link` is
/// refused with [`Error::NotALink`] so a stray copy is never deleted.
pub fn remove_link(link: &Path) -> Result<bool> {
    let meta = match fs::symlink_metadata(link) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(Error::io(link, e)),
    };

    if meta.file_type().is_symlink() {
        remove_symlink(link).map_err(|e| Error::io(link, e))?;
        Ok(true)
    } else if meta.is_file() {
        fs::remove_file(link).map_err(|e| Error::io(link, e))?;
        Ok(true)
    } else {
        Err(Error::NotALink {
            path: link.to_path_buf(),
        })
    }
}

/// Where `link` points, or `None` if it is absent or not a link.
pub fn read_link(link: &Path) -> Result<Option<PathBuf>> {
    match fs::read_link(link) {
        Ok(target) => Ok(Some(target)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) if e.kind() == ErrorKind::InvalidInput => Ok(None),
        Err(e) => Err(Error::io(link, e)),
    }
}

/// True if `path` exists as an entry (link or otherwise), even when dangling.
pub fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// True if `link` is a link whose target no longer resolves.
pub fn is_dangling(link: &Path) -> bool {
    match fs::symlink_metadata(link) {
        Ok(meta) => meta.file_type().is_symlink() && fs::metadata(link).is_err(),
        Err(_) => false,
    }
}

#[cfg(unix)]
fn symlink_dir(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_dir(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

#[cfg(unix)]
fn remove_symlink(link: &Path) -> std::io::Result<()> {
    fs::remove_file(link)
}

#[cfg(windows)]
fn remove_symlink(link: &Path) -> std::io::Result<()> {
    // Directory symlinks are removed as directories on Windows.
    fs::remove_dir(link).or_else(|_| fs::remove_file(link))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn create_then_read_link() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("registry/git");
        fs::create_dir_all(&target).unwrap();
        let link = temp.path().join("active/git");

        create_link(&target, &link).unwrap();

        assert_eq!(read_link(&link).unwrap(), Some(target.clone()));
        assert!(link.join(".").exists());
    }

    #[test]
    fn create_link_requires_target() {
        let temp = TempDir::new().unwrap();
        let err = create_link(&temp.path().join("missing"), &temp.path().join("l")).unwrap_err();
        assert!(matches!(err, Error::LinkTargetMissing { .. }));
    }

    #[test]
    fn remove_link_reports_absence() {
        let temp = TempDir::new().unwrap();
        assert!(!remove_link(&temp.path().join("nothing")).unwrap());
    }

    #[test]
    fn remove_link_refuses_real_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("copy");
        fs::create_dir(&dir).unwrap();

        let err = remove_link(&dir).unwrap_err();
        assert!(matches!(err, Error::NotALink { .. }));
        assert!(dir.is_dir());
    }

    #[test]
    fn dangling_link_is_detected_and_removable() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("pkg");
        fs::create_dir(&target).unwrap();
        let link = temp.path().join("active-pkg");
        create_link(&target, &link).unwrap();

        fs::remove_dir(&target).unwrap();

        assert!(is_dangling(&link));
        assert!(entry_exists(&link));
        assert!(remove_link(&link).unwrap());
        assert!(!entry_exists(&link));
    }
}
