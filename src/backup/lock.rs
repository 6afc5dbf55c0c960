//! Run lock for a backup directory
//!
//! Two overlapping invocations on the same directory could each prune what
//! the other just decided to keep. The lock is an advisory `flock` on
//! `.{prefix}.lock`: the kernel drops it when the holder exits, so a run
//! that crashed or was killed never blocks the next one. The file itself
//! stays in place and only records the holder's pid for diagnostics.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{BackupError, BackupResult};
use crate::models::BackupNaming;

/// Exclusive hold on a backup directory for one prefix
///
/// Released when dropped (or when the process dies).
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
    _file: File,
}

impl RunLock {
    /// Acquire the lock in `dir`, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns `BackupError::Locked` if another live run holds the lock.
    pub fn acquire(dir: &Path, naming: &BackupNaming) -> BackupResult<Self> {
        fs::create_dir_all(dir).map_err(|e| {
            BackupError::Io(format!(
                "Failed to create backup directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let path = dir.join(naming.lock_file_name());
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| {
                BackupError::Io(format!("Failed to open lock file {}: {}", path.display(), e))
            })?;

        if !try_lock_exclusive(&file)
            .map_err(|e| BackupError::Io(format!("Failed to lock {}: {}", path.display(), e)))?
        {
            return Err(BackupError::Locked(path));
        }

        // Only the holder rewrites the pid.
        file.set_len(0)
            .and_then(|_| writeln!(file, "{}", std::process::id()))
            .map_err(|e| BackupError::Io(format!("Failed to write lock file: {}", e)))?;

        debug!(lock = %path.display(), "acquired run lock");
        Ok(Self { path, _file: file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Non-blocking exclusive `flock`; `Ok(false)` when someone else holds it
#[cfg(unix)]
fn try_lock_exclusive(file: &File) -> io::Result<bool> {
    use std::os::unix::io::AsRawFd;

    let ret = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if ret == 0 {
        return Ok(true);
    }
    let err = io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::EWOULDBLOCK) {
        Ok(false)
    } else {
        Err(err)
    }
}

// Archives are made with the system `tar`; only Unix enforces the lock.
#[cfg(not(unix))]
fn try_lock_exclusive(_file: &File) -> io::Result<bool> {
    Ok(true)
}
