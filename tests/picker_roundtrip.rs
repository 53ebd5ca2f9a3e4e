//! Round trips from `list` output through a picker back to a stored clip.
//!
//! A picker echoes a displayed line (or only its value, for `list --simple`),
//! possibly trimmed. These tests feed such lines to `recall` and `delete`
//! and check the right clip is chosen.

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use clipstash::backend::ClipboardBackend;
use clipstash::cli::{ListArgs, cmd_delete, cmd_list, cmd_recall, selection_from_input};
use clipstash::rendering::{ListOptions, format_line};
use clipstash::storage::{HistoryBackend, ImageStore, SqliteHistoryBackend};
use clipstash::{
    Capture, ClipConfig, ContentHasher, ContentKind, EntryId, Error, HistoryService, LooseMatcher,
    Result,
};
use proptest::prelude::*;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use tempfile::TempDir;

// ============================================================================
// Test Helpers
// ============================================================================

/// Records what `recall` puts on the clipboard.
#[derive(Default)]
struct RecordingBackend {
    applied: Mutex<Vec<(String, ContentKind)>>,
}

impl RecordingBackend {
    fn last_applied(&self) -> Option<(String, ContentKind)> {
        self.applied.lock().unwrap().last().cloned()
    }
}

impl ClipboardBackend for RecordingBackend {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn fetch(&self) -> Result<Option<Capture>> {
        Ok(None)
    }

    fn apply(&self, value: &str, kind: ContentKind) -> Result<()> {
        self.applied.lock().unwrap().push((value.to_string(), kind));
        Ok(())
    }

    fn active_window_class(&self) -> Option<String> {
        None
    }

    fn watch(&self, _shutdown: &AtomicBool, _on_change: &mut dyn FnMut()) -> Result<()> {
        Ok(())
    }
}

fn service_with(values: &[&str]) -> HistoryService {
    let service =
        HistoryService::new(SqliteHistoryBackend::in_memory().unwrap(), ClipConfig::default());
    for value in values {
        service.store().upsert(&Capture::text(*value), 100).unwrap();
    }
    service
}

fn listing(service: &HistoryService, options: ListOptions) -> Vec<String> {
    let mut out = Vec::new();
    let args = ListArgs {
        options,
        ..ListArgs::default()
    };
    cmd_list(service, args, &mut out).unwrap();
    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Recall
// ============================================================================

#[test]
fn test_recall_every_listed_line() {
    let service = service_with(&["plain", "two\nlines", "  padded  ", "tab\tinside"]);
    let backend = RecordingBackend::default();

    for line in listing(&service, ListOptions::default()) {
        let recalled = cmd_recall(&service, &backend, &selection_from_input(&line))
            .unwrap()
            .unwrap();
        let (applied, kind) = backend.last_applied().unwrap();
        let expected = service.get(recalled).unwrap();
        assert_eq!(applied, expected.value);
        assert_eq!(kind, ContentKind::Text);
    }
}

#[test]
fn test_recall_simple_lines_by_content() {
    let service = service_with(&["alpha", "multi\nline clip", "  spaced"]);
    let backend = RecordingBackend::default();

    let lines = listing(
        &service,
        ListOptions {
            simple: true,
            full: false,
        },
    );
    assert_eq!(lines, vec!["  spaced", "multi\\nline clip", "alpha"]);

    cmd_recall(&service, &backend, &selection_from_input("multi\\nline clip\n")).unwrap();
    assert_eq!(backend.last_applied().unwrap().0, "multi\nline clip");

    // A shell that trimmed the picker output still finds the padded clip
    cmd_recall(&service, &backend, &selection_from_input("spaced")).unwrap();
    assert_eq!(backend.last_applied().unwrap().0, "  spaced");
}

#[test]
fn test_recall_truncated_line_uses_substring() {
    let long = "x".repeat(150) + "tail";
    let service = service_with(&[long.as_str()]);
    let backend = RecordingBackend::default();

    let line = listing(
        &service,
        ListOptions {
            simple: false,
            full: false,
        },
    )
    .remove(0);
    // Drop the listing prefix so only the truncated value remains
    let value = line.split_once("] ").unwrap().1;

    cmd_recall(&service, &backend, &selection_from_input(value)).unwrap();
    assert_eq!(backend.last_applied().unwrap().0, long);
}

#[test]
fn test_recall_image_line() {
    let dir = TempDir::new().unwrap();
    let images = ImageStore::new(dir.path().join("images"));
    let bytes = b"\x89PNG pixels";
    let hash = ContentHasher::hash(bytes);
    let path = images.store(&hash, "png", bytes).unwrap();

    let service = service_with(&["some text"]);
    service
        .store()
        .upsert(&Capture::image(&path, hash), 100)
        .unwrap();
    let backend = RecordingBackend::default();

    let simple = listing(
        &service,
        ListOptions {
            simple: true,
            full: false,
        },
    );
    assert_eq!(simple[0], format!("[Image] {}", path.display()));

    cmd_recall(&service, &backend, &selection_from_input(&simple[0])).unwrap();
    assert_eq!(
        backend.last_applied().unwrap(),
        (path.to_string_lossy().into_owned(), ContentKind::Image)
    );
}

#[test]
fn test_recall_missing_image_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("vanished.png");
    let service = service_with(&[]);
    let id = service
        .store()
        .upsert(&Capture::image(&path, "feedface"), 100)
        .unwrap()
        .id();
    let backend = RecordingBackend::default();

    let line = listing(&service, ListOptions::default()).remove(0);
    assert!(line.contains("[Image] [Missing] "));

    let err = cmd_recall(&service, &backend, &selection_from_input(&line)).unwrap_err();
    assert!(matches!(err, Error::MissingImageFile { id: missing, .. } if missing == id));
    assert!(err.is_expected_miss());
    assert!(backend.last_applied().is_none());
}

#[test]
fn test_recall_no_match_is_not_found() {
    let service = service_with(&["alpha"]);
    let backend = RecordingBackend::default();

    let err = cmd_recall(&service, &backend, &selection_from_input("zzz")).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_recall_cancelled_picker_is_noop() {
    let service = service_with(&["alpha"]);
    let backend = RecordingBackend::default();

    assert_eq!(
        cmd_recall(&service, &backend, &selection_from_input("\n")).unwrap(),
        None
    );
    assert!(backend.last_applied().is_none());
}

// ============================================================================
// Delete
// ============================================================================

#[test]
fn test_delete_listed_line() {
    let service = service_with(&["keep", "drop me"]);
    let line = listing(&service, ListOptions::default()).remove(0);

    let deleted = cmd_delete(&service, &selection_from_input(&line)).unwrap();

    assert_eq!(deleted, Some(EntryId::new(2)));
    assert_eq!(service.list(10).unwrap().len(), 1);
}

#[test]
fn test_delete_bare_id_fallback() {
    let service = service_with(&["first", "second"]);

    let deleted = cmd_delete(&service, &selection_from_input("1\n")).unwrap();

    assert_eq!(deleted, Some(EntryId::new(1)));
    assert_eq!(service.list(10).unwrap()[0].value, "second");
}

#[test]
fn test_delete_numeric_clip_prefers_content() {
    let service = service_with(&["other", "1"]);

    let deleted = cmd_delete(&service, &selection_from_input("1")).unwrap();

    // "1" is clip 2's content, so content matching wins over the id reading
    assert_eq!(deleted, Some(EntryId::new(2)));
}

#[test]
fn test_delete_unknown_is_not_found() {
    let service = service_with(&["a"]);
    let err = cmd_delete(&service, &selection_from_input("42")).unwrap_err();
    assert!(err.is_expected_miss());
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Property: every stored value is found again from its full-display line
    /// and from that line trimmed.
    #[test]
    fn prop_display_line_resolves_to_value(value in "[a-m][a-m \n]{0,20}") {
        let store = SqliteHistoryBackend::in_memory().unwrap();
        store.upsert(&Capture::text(value.clone()), 100).unwrap();
        let entry = store.list(1).unwrap().remove(0);

        let line = format_line(&entry, ListOptions { simple: true, full: true });
        let matcher = LooseMatcher::new(&store);

        let found = matcher.resolve(&line).unwrap().unwrap();
        prop_assert_eq!(&found.value, &value);

        let found = matcher.resolve(line.trim()).unwrap().unwrap();
        prop_assert_eq!(&found.value, &value);
    }

    /// Property: the listing prefix always parses back to the entry id.
    #[test]
    fn prop_listing_prefix_roundtrips(value in "[ -~]{1,40}") {
        let store = SqliteHistoryBackend::in_memory().unwrap();
        let id = store.upsert(&Capture::text(value), 100).unwrap().id();
        let entry = store.get(id).unwrap().unwrap();

        let line = format_line(&entry, ListOptions::default());
        prop_assert_eq!(clipstash::rendering::parse_listing_id(&line), Some(id));
    }
}
