//! `recall` command: put a clip back on the clipboard.

use super::Selection;
use crate::backend::ClipboardBackend;
use crate::models::{Entry, EntryId};
use crate::services::HistoryService;
use crate::storage::HistoryBackend;
use crate::Result;

/// Restores the selected clip.
///
/// A listing-prefixed line restores that id if it still exists and otherwise
/// falls back to matching the line's content. Returns `None` when the
/// selection was empty.
///
/// # Errors
///
/// Returns [`crate::Error::NotFound`] if nothing matches,
/// [`crate::Error::MissingImageFile`] for an image whose file is gone, or the
/// backend's error if applying fails.
pub fn cmd_recall<S: HistoryBackend>(
    service: &HistoryService<S>,
    backend: &dyn ClipboardBackend,
    selection: &Selection,
) -> Result<Option<EntryId>> {
    let entry = match selection {
        Selection::Nothing => return Ok(None),
        Selection::Id(id) => service.get(*id)?,
        Selection::Line { id, line } => lookup_line(service, *id, line)?,
    };

    service.restore(backend, &entry)?;
    Ok(Some(entry.id))
}

fn lookup_line<S: HistoryBackend>(
    service: &HistoryService<S>,
    id: Option<EntryId>,
    line: &str,
) -> Result<Entry> {
    if let Some(id) = id
        && let Some(entry) = service.store().get(id)?
    {
        return Ok(entry);
    }
    service.resolve(line)
}
