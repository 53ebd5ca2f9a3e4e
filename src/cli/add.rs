//! `add` command: one capture cycle.

use crate::Result;
use crate::backend::ClipboardBackend;
use crate::services::{AddOutcome, HistoryService};
use crate::storage::HistoryBackend;

/// Records the current clipboard content, unless the focused window is
/// blacklisted or there is nothing to capture.
///
/// # Errors
///
/// Returns an error if the store cannot be written.
pub fn cmd_add<S: HistoryBackend>(
    service: &HistoryService<S>,
    backend: &dyn ClipboardBackend,
) -> Result<AddOutcome> {
    let outcome = service.capture(backend)?;
    match &outcome {
        AddOutcome::Stored(stored) => {
            tracing::info!(id = %stored.id(), inserted = stored.is_inserted(), "Added clip");
        },
        AddOutcome::Blacklisted(class) => {
            tracing::info!(class = %class, "Active window is blacklisted, not adding");
        },
        AddOutcome::NothingToCapture => tracing::info!("Nothing to add"),
    }
    Ok(outcome)
}
