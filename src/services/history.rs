//! History operations that combine the store, the config and a clipboard backend.

use crate::backend::ClipboardBackend;
use crate::config::ClipConfig;
use crate::models::{Entry, EntryId};
use crate::services::LooseMatcher;
use crate::storage::{HistoryBackend, SqliteHistoryBackend, UpsertOutcome};
use crate::{Error, Result};
use std::time::Instant;
use tracing::instrument;

/// Result of one capture cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// The clipboard content was recorded.
    Stored(UpsertOutcome),
    /// The focused window's class is blacklisted; nothing was fetched.
    Blacklisted(String),
    /// The clipboard was empty, unsupported or marked sensitive.
    NothingToCapture,
}

/// Capture, restore, delete and clear, with the config threaded in.
///
/// # Example
///
/// ```rust,ignore
/// let store = SqliteHistoryBackend::new(paths.db_path())?;
/// let service = HistoryService::new(store, config);
/// match service.capture(backend.as_ref())? {
///     AddOutcome::Stored(outcome) => println!("stored {}", outcome.id()),
///     _ => {}
/// }
/// ```
pub struct HistoryService<S: HistoryBackend = SqliteHistoryBackend> {
    store: S,
    config: ClipConfig,
}

impl<S: HistoryBackend> HistoryService<S> {
    /// Creates a service over `store`.
    pub const fn new(store: S, config: ClipConfig) -> Self {
        Self { store, config }
    }

    /// Returns the underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns the active configuration.
    pub const fn config(&self) -> &ClipConfig {
        &self.config
    }

    /// Runs one capture cycle: blacklist gate, fetch, upsert.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to fetch or the store fails to
    /// record. A blacklisted window, an empty clipboard and sensitive content
    /// are not errors.
    #[instrument(skip(self, backend), fields(backend = backend.name()))]
    pub fn capture(&self, backend: &dyn ClipboardBackend) -> Result<AddOutcome> {
        let start = Instant::now();

        if let Some(class) = backend.active_window_class()
            && self.config.is_blacklisted(&class)
        {
            tracing::debug!(class = %class, "Skipping capture from blacklisted window");
            metrics::counter!("captures_total", "outcome" => "blacklisted").increment(1);
            return Ok(AddOutcome::Blacklisted(class));
        }

        let Some(capture) = backend.fetch()? else {
            metrics::counter!("captures_total", "outcome" => "empty").increment(1);
            return Ok(AddOutcome::NothingToCapture);
        };

        let outcome = self.store.upsert(&capture, self.config.max_entries)?;
        metrics::counter!(
            "captures_total",
            "outcome" => if outcome.is_inserted() { "inserted" } else { "refreshed" }
        )
        .increment(1);
        metrics::histogram!("capture_duration_ms")
            .record(start.elapsed().as_secs_f64() * 1000.0);

        Ok(AddOutcome::Stored(outcome))
    }

    /// Looks up an entry by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such entry exists.
    pub fn get(&self, id: EntryId) -> Result<Entry> {
        self.store
            .get(id)?
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Resolves picker output to an entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if nothing matches.
    pub fn resolve(&self, input: &str) -> Result<Entry> {
        LooseMatcher::new(&self.store)
            .resolve(input)?
            .ok_or_else(|| Error::NotFound(format!("no clip matches '{}'", input.trim())))
    }

    /// Puts `entry` back on the clipboard.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingImageFile`] if the entry is an image whose file
    /// is gone, or the backend's error if applying fails.
    #[instrument(skip(self, backend, entry), fields(id = %entry.id, kind = %entry.kind))]
    pub fn restore(&self, backend: &dyn ClipboardBackend, entry: &Entry) -> Result<()> {
        if entry.is_missing_image() {
            return Err(Error::MissingImageFile {
                id: entry.id,
                path: entry.value.clone().into(),
            });
        }

        backend.apply(&entry.value, entry.kind)?;
        tracing::info!(id = %entry.id, "Restored clip");
        Ok(())
    }

    /// Deletes an entry by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such entry exists.
    pub fn delete(&self, id: EntryId) -> Result<()> {
        if self.store.delete(id)? {
            tracing::info!(id = %id, "Deleted clip");
            Ok(())
        } else {
            Err(Error::NotFound(id.to_string()))
        }
    }

    /// Clears all entries, or only those matching `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] for an uncompilable pattern.
    pub fn clear(&self, pattern: Option<&str>) -> Result<usize> {
        self.store.clear(pattern)
    }

    /// Most recent entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn list(&self, limit: usize) -> Result<Vec<Entry>> {
        self.store.list(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Capture, ContentKind};
    use std::sync::Mutex;
    use std::sync::atomic::AtomicBool;

    #[derive(Default)]
    struct FakeBackend {
        clip: Option<Capture>,
        window: Option<String>,
        applied: Mutex<Vec<(String, ContentKind)>>,
    }

    impl ClipboardBackend for FakeBackend {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn fetch(&self) -> Result<Option<Capture>> {
            Ok(self.clip.clone())
        }

        fn apply(&self, value: &str, kind: ContentKind) -> Result<()> {
            self.applied.lock().unwrap().push((value.to_string(), kind));
            Ok(())
        }

        fn active_window_class(&self) -> Option<String> {
            self.window.clone()
        }

        fn watch(&self, _shutdown: &AtomicBool, _on_change: &mut dyn FnMut()) -> Result<()> {
            Ok(())
        }
    }

    fn service(config: ClipConfig) -> HistoryService {
        HistoryService::new(SqliteHistoryBackend::in_memory().unwrap(), config)
    }

    #[test]
    fn test_capture_stores_clip() {
        let service = service(ClipConfig::default());
        let backend = FakeBackend {
            clip: Some(Capture::text("copied")),
            ..FakeBackend::default()
        };

        let outcome = service.capture(&backend).unwrap();

        assert!(matches!(outcome, AddOutcome::Stored(ref o) if o.is_inserted()));
        assert_eq!(service.list(10).unwrap()[0].value, "copied");
    }

    #[test]
    fn test_capture_blacklist_is_case_insensitive() {
        let config = ClipConfig {
            blacklist: vec!["KeePassXC".to_string()],
            ..ClipConfig::default()
        };
        let service = service(config);
        let backend = FakeBackend {
            clip: Some(Capture::text("hunter2")),
            window: Some("keepassxc".to_string()),
            ..FakeBackend::default()
        };

        let outcome = service.capture(&backend).unwrap();

        assert_eq!(outcome, AddOutcome::Blacklisted("keepassxc".to_string()));
        assert_eq!(service.store().count().unwrap(), 0);
    }

    #[test]
    fn test_capture_nothing() {
        let service = service(ClipConfig::default());
        let outcome = service.capture(&FakeBackend::default()).unwrap();
        assert_eq!(outcome, AddOutcome::NothingToCapture);
    }

    #[test]
    fn test_capture_respects_max_entries() {
        let config = ClipConfig {
            max_entries: 2,
            ..ClipConfig::default()
        };
        let service = service(config);
        for text in ["a", "b", "c"] {
            let backend = FakeBackend {
                clip: Some(Capture::text(text)),
                ..FakeBackend::default()
            };
            service.capture(&backend).unwrap();
        }
        assert_eq!(service.store().count().unwrap(), 2);
    }

    #[test]
    fn test_restore_applies_value() {
        let service = service(ClipConfig::default());
        let backend = FakeBackend::default();
        let id = service
            .store()
            .upsert(&Capture::text("again"), 10)
            .unwrap()
            .id();

        let entry = service.get(id).unwrap();
        service.restore(&backend, &entry).unwrap();

        assert_eq!(
            backend.applied.lock().unwrap().as_slice(),
            &[("again".to_string(), ContentKind::Text)]
        );
    }

    #[test]
    fn test_restore_missing_image() {
        let service = service(ClipConfig::default());
        let backend = FakeBackend::default();
        let id = service
            .store()
            .upsert(&Capture::image("/nonexistent/clipstash/x.png", "abc"), 10)
            .unwrap()
            .id();

        let entry = service.get(id).unwrap();
        let err = service.restore(&backend, &entry).unwrap_err();

        assert!(matches!(err, Error::MissingImageFile { .. }));
        assert!(backend.applied.lock().unwrap().is_empty());
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let service = service(ClipConfig::default());
        let err = service.delete(EntryId::new(99)).unwrap_err();
        assert!(err.is_expected_miss());
    }

    #[test]
    fn test_resolve_miss_is_not_found() {
        let service = service(ClipConfig::default());
        assert!(matches!(service.resolve("nope"), Err(Error::NotFound(_))));
    }
}
