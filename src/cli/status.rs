//! `status` command.

use super::CliContext;
use crate::Result;
use crate::backend::{BackendKind, SessionEnv, select_backend};
use crate::daemon::{DaemonStatus, read_status};
use crate::storage::{HistoryBackend, SqliteHistoryBackend};
use std::fmt;
use std::path::PathBuf;

/// What `status` reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    /// Whether the daemon holds its lock.
    pub daemon: DaemonStatus,
    /// The backend that would be selected, or why none would.
    pub backend: std::result::Result<BackendKind, String>,
    /// History database location.
    pub db_path: PathBuf,
    /// Stored clips, when the database exists and is readable.
    pub entries: Option<usize>,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.daemon {
            DaemonStatus::Running { pid: Some(pid) } => {
                writeln!(f, "Daemon:   running (pid {pid})")?;
            },
            DaemonStatus::Running { pid: None } => writeln!(f, "Daemon:   running")?,
            DaemonStatus::Stopped => writeln!(f, "Daemon:   not running")?,
        }
        match &self.backend {
            Ok(kind) => writeln!(f, "Backend:  {kind}")?,
            Err(reason) => writeln!(f, "Backend:  unavailable ({reason})")?,
        }
        writeln!(f, "Database: {}", self.db_path.display())?;
        match self.entries {
            Some(count) => write!(f, "Entries:  {count}"),
            None => write!(f, "Entries:  unknown"),
        }
    }
}

/// Gathers daemon, backend and store status.
///
/// # Errors
///
/// Returns an error if the lock file exists but cannot be checked.
pub fn cmd_status(context: &CliContext) -> Result<StatusReport> {
    let paths = context.paths();
    let daemon = read_status(&paths.lock_path())?;
    let backend = select_backend(&SessionEnv::detect()).map_err(|e| e.to_string());

    let db_path = paths.db_path();
    let entries = if db_path.exists() {
        SqliteHistoryBackend::new(&db_path)
            .and_then(|store| store.count())
            .map_err(|e| tracing::warn!(error = %e, "Cannot read history database"))
            .ok()
    } else {
        Some(0)
    };

    Ok(StatusReport {
        daemon,
        backend,
        db_path,
        entries,
    })
}
