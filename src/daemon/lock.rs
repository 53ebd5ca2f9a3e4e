//! Single-instance lock for the capture daemon.

use crate::{Error, Result};
use std::fs::{File, OpenOptions, TryLockError};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Whether a daemon holds the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonStatus {
    /// The lock is held. `pid` is read from the lock file when present.
    Running {
        /// Process id recorded by the running daemon.
        pid: Option<u32>,
    },
    /// Nobody holds the lock.
    Stopped,
}

/// Exclusive, non-blocking lock on `daemon.lock`, held for the daemon's
/// lifetime. The OS releases it when the process exits, however it exits.
#[derive(Debug)]
pub struct DaemonLock {
    file: File,
    path: PathBuf,
}

impl DaemonLock {
    /// Takes the lock and records the current pid in the file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if another daemon holds the lock or
    /// the file cannot be opened or written.
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| Error::failed("open_daemon_lock", e))?;

        match file.try_lock() {
            Ok(()) => {},
            Err(TryLockError::WouldBlock) => {
                let pid = read_pid(&mut file);
                return Err(Error::failed(
                    "acquire_daemon_lock",
                    match pid {
                        Some(pid) => format!("clipstash daemon is already running (pid {pid})"),
                        None => "clipstash daemon is already running".to_string(),
                    },
                ));
            },
            Err(TryLockError::Error(e)) => return Err(Error::failed("acquire_daemon_lock", e)),
        }

        // Only truncate once the lock is ours, so a running daemon's pid survives
        file.set_len(0)
            .and_then(|()| file.seek(SeekFrom::Start(0)))
            .and_then(|_| write!(file, "{}", std::process::id()))
            .and_then(|()| file.flush())
            .map_err(|e| Error::failed("write_daemon_pid", e))?;

        tracing::debug!(path = %path.display(), pid = std::process::id(), "Acquired daemon lock");
        Ok(Self { file, path })
    }

    /// Returns the lock file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DaemonLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// Checks whether a daemon holds the lock at `path`, without taking it for
/// longer than the check.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if the lock file exists but cannot be
/// opened or locked.
pub fn read_status(path: &Path) -> Result<DaemonStatus> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(DaemonStatus::Stopped),
        Err(e) => return Err(Error::failed("open_daemon_lock", e)),
    };

    match file.try_lock() {
        Ok(()) => {
            let _ = file.unlock();
            Ok(DaemonStatus::Stopped)
        },
        Err(TryLockError::WouldBlock) => Ok(DaemonStatus::Running {
            pid: read_pid(&mut file),
        }),
        Err(TryLockError::Error(e)) => Err(Error::failed("read_daemon_lock", e)),
    }
}

fn read_pid(file: &mut File) -> Option<u32> {
    let mut contents = String::new();
    file.seek(SeekFrom::Start(0)).ok()?;
    file.read_to_string(&mut contents).ok()?;
    contents.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_acquire_writes_pid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("daemon.lock");

        let lock = DaemonLock::acquire(&path).unwrap();

        assert_eq!(lock.path(), path);
        let pid: u32 = std::fs::read_to_string(&path).unwrap().trim().parse().unwrap();
        assert_eq!(pid, std::process::id());
    }

    #[test]
    fn test_second_acquire_fails_while_held() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("daemon.lock");

        let _lock = DaemonLock::acquire(&path).unwrap();
        let err = DaemonLock::acquire(&path).unwrap_err();

        assert!(err.to_string().contains("already running"));
    }

    #[test]
    fn test_lock_released_on_drop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("daemon.lock");

        drop(DaemonLock::acquire(&path).unwrap());
        DaemonLock::acquire(&path).unwrap();
    }

    #[test]
    fn test_read_status() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("daemon.lock");

        assert_eq!(read_status(&path).unwrap(), DaemonStatus::Stopped);

        let lock = DaemonLock::acquire(&path).unwrap();
        assert_eq!(
            read_status(&path).unwrap(),
            DaemonStatus::Running {
                pid: Some(std::process::id())
            }
        );

        drop(lock);
        assert_eq!(read_status(&path).unwrap(), DaemonStatus::Stopped);
    }
}
