//! `daemon` command.

use super::CliContext;
use crate::Result;
use crate::daemon::{DaemonLock, install_shutdown_handler, run_watch_loop};

/// Runs the capture daemon until SIGINT/SIGTERM.
///
/// Takes the single-instance lock first, so a second daemon fails fast
/// without touching the clipboard.
///
/// # Errors
///
/// Returns an error if another daemon is running, no backend is available,
/// the store cannot be opened, or the store fails while running.
pub fn cmd_daemon(context: &CliContext) -> Result<()> {
    context.paths().ensure_data_dir()?;
    let lock = DaemonLock::acquire(context.paths().lock_path())?;

    let backend = context.backend()?;
    let service = context.open_service()?;
    let shutdown = install_shutdown_handler()?;
    let db_path = context.paths().db_path();

    tracing::info!(
        backend = backend.name(),
        db = %db_path.display(),
        lock = %lock.path().display(),
        max_entries = context.config().max_entries,
        "Starting clipstash daemon"
    );

    let result = run_watch_loop(&service, backend.as_ref(), &shutdown);
    tracing::info!("Stopping clipstash daemon");
    drop(lock);
    result
}
