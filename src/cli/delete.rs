//! `delete` command.

use super::Selection;
use crate::models::EntryId;
use crate::services::HistoryService;
use crate::storage::HistoryBackend;
use crate::{Error, Result};

/// Deletes the selected clip. Returns `None` when the selection was empty.
///
/// A listing-prefixed line deletes that id. Any other line is matched by
/// content; if that fails and the line is a bare number, it is taken as an id.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the selection matches no clip.
pub fn cmd_delete<S: HistoryBackend>(
    service: &HistoryService<S>,
    selection: &Selection,
) -> Result<Option<EntryId>> {
    let id = match selection {
        Selection::Nothing => return Ok(None),
        Selection::Id(id) | Selection::Line { id: Some(id), .. } => *id,
        Selection::Line { id: None, line } => match service.resolve(line) {
            Ok(entry) => entry.id,
            Err(Error::NotFound(_)) if is_bare_number(line) => line
                .parse::<i64>()
                .map(EntryId::new)
                .map_err(|_| Error::NotFound(line.clone()))?,
            Err(e) => return Err(e),
        },
    };

    service.delete(id)?;
    Ok(Some(id))
}

fn is_bare_number(line: &str) -> bool {
    !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit())
}
