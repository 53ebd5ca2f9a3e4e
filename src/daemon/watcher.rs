//! The capture loop run by `clipstash daemon`.

use crate::backend::ClipboardBackend;
use crate::services::{AddOutcome, HistoryService};
use crate::storage::HistoryBackend;
use crate::{Error, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Installs a SIGINT/SIGTERM handler that raises the returned flag.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if a handler is already installed.
pub fn install_shutdown_handler() -> Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&flag);
    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::SeqCst);
    })
    .map_err(|e| Error::failed("install_signal_handler", e))?;
    Ok(flag)
}

/// Runs one capture cycle per clipboard change until `shutdown` is raised.
///
/// A failing cycle is logged and the loop continues, except when the store
/// itself is unavailable: then the loop stops and the error is returned,
/// since continuing would silently drop history.
///
/// # Errors
///
/// Returns the store error that stopped the loop, or the backend's error if
/// watching fails.
pub fn run_watch_loop<S: HistoryBackend>(
    service: &HistoryService<S>,
    backend: &dyn ClipboardBackend,
    shutdown: &AtomicBool,
) -> Result<()> {
    let mut fatal: Option<Error> = None;

    let mut on_change = || match service.capture(backend) {
        Ok(AddOutcome::Stored(outcome)) => {
            tracing::debug!(id = %outcome.id(), inserted = outcome.is_inserted(), "Captured clipboard change");
        },
        Ok(AddOutcome::Blacklisted(class)) => {
            tracing::debug!(class = %class, "Ignored change from blacklisted window");
        },
        Ok(AddOutcome::NothingToCapture) => {},
        Err(e @ Error::StoreUnavailable { .. }) => {
            tracing::error!(error = %e, "History store unavailable, stopping daemon");
            fatal = Some(e);
            shutdown.store(true, Ordering::SeqCst);
        },
        Err(e) => {
            tracing::warn!(error = %e, "Capture cycle failed");
        },
    };

    backend.watch(shutdown, &mut on_change)?;

    match fatal {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
