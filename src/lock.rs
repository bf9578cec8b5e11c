//! File-based locking to prevent two optimizer runs on the same denylist.
//!
//! Uses flock-style advisory locking on `<denylist>.lock`. Readers of the
//! denylist never take this lock; it only serializes writers.

use fs2::FileExt;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::DenylistError;

/// A guard that holds an exclusive lock next to a denylist file.
/// The lock is automatically released when the guard is dropped.
#[derive(Debug)]
pub struct LockGuard {
    _file: File,
    path: PathBuf,
}

/// Lock file path used for `denylist`.
pub fn lock_path_for(denylist: &Path) -> PathBuf {
    let mut name = denylist
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("denylist"));
    name.push(".lock");
    denylist.with_file_name(name)
}

impl LockGuard {
    /// Attempt to acquire the lock for `denylist` without blocking.
    pub fn acquire(denylist: &Path) -> Result<Self, DenylistError> {
        let path = lock_path_for(denylist);

        // create+read+write without truncate avoids a race between create and lock
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| DenylistError::io(&path, e))?;

        file.try_lock_exclusive().map_err(|_| {
            DenylistError::Lock(format!(
                "Another optimizer run holds {:?}. Wait for it to complete.",
                path
            ))
        })?;

        Ok(Self { _file: file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
