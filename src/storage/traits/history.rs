//! History backend trait.

use crate::Result;
use crate::models::{Capture, Entry, EntryId};

/// Result of recording a capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// New content; a row was inserted and `evicted` rows were trimmed to
    /// respect the retention cap.
    Inserted {
        /// Id of the new row.
        id: EntryId,
        /// Ids removed by retention eviction, oldest first.
        evicted: Vec<EntryId>,
    },
    /// Content already present; only its `last_seen` moved forward.
    Refreshed {
        /// Id of the existing row.
        id: EntryId,
    },
}

impl UpsertOutcome {
    /// Id of the row holding the captured content.
    #[must_use]
    pub const fn id(&self) -> EntryId {
        match self {
            Self::Inserted { id, .. } | Self::Refreshed { id } => *id,
        }
    }

    /// Returns true if a new row was created.
    #[must_use]
    pub const fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted { .. })
    }
}

/// Persistent, deduplicated clip history.
///
/// Implementations are the single source of truth shared between the capture
/// daemon and one-shot CLI invocations, which may run concurrently in separate
/// processes. Every mutating operation must be atomic with respect to the
/// others.
pub trait HistoryBackend: Send + Sync {
    /// Records a capture.
    ///
    /// If an entry with the same content hash exists, its `last_seen` is
    /// refreshed and its id, kind and value are kept. Otherwise a new row is
    /// inserted and, when the row count exceeds `retention_cap`, the oldest
    /// rows (by `last_seen`, then id) are evicted together with their image
    /// files.
    fn upsert(&self, capture: &Capture, retention_cap: usize) -> Result<UpsertOutcome>;

    /// Lists up to `limit` entries, most recently seen first.
    fn list(&self, limit: usize) -> Result<Vec<Entry>>;

    /// Retrieves an entry by id.
    fn get(&self, id: EntryId) -> Result<Option<Entry>>;

    /// Deletes an entry and, for images, its backing file.
    ///
    /// Returns false if no such entry existed; deleting twice is not an error.
    fn delete(&self, id: EntryId) -> Result<bool>;

    /// Removes entries.
    ///
    /// With no pattern every entry is removed and id assignment restarts at 1.
    /// With a pattern only entries whose value matches it (unanchored regex
    /// search) are removed and the id counter is left alone. Returns the number
    /// of rows removed.
    fn clear(&self, pattern: Option<&str>) -> Result<usize>;

    /// Finds the most recently seen entry whose value equals `candidate`,
    /// falling back to comparison with surrounding whitespace trimmed on both
    /// sides.
    fn find_by_value(&self, candidate: &str) -> Result<Option<Entry>>;

    /// Returns the number of stored entries.
    fn count(&self) -> Result<usize>;
}
