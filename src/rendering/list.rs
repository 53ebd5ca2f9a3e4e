//! `list` output lines and parsing them back.
//!
//! A line looks like `12 [T] first line\nsecond line`: id, kind tag, then the
//! display value. Pickers echo the chosen line back on stdin, so the format
//! here and [`parse_listing_id`] must stay in sync.

use crate::models::{ContentKind, Entry, EntryId};
use crate::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Display prefix for image entries.
pub const IMAGE_PREFIX: &str = "[Image] ";

/// Display prefix for image entries whose file is gone.
pub const MISSING_IMAGE_PREFIX: &str = "[Image] [Missing] ";

/// Text display values are cut to this many characters unless `full`.
pub const DISPLAY_TRUNCATE_CHARS: usize = 100;

static LISTING_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+)\s+\[[A-Z]\]").unwrap_or_else(|_| unreachable!())
});

/// Options for `list`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Print only the display value, never truncated.
    pub simple: bool,
    /// Do not truncate text.
    pub full: bool,
}

/// Single-line display form of an entry's value.
#[must_use]
pub fn display_value(entry: &Entry, options: ListOptions) -> String {
    match entry.kind {
        ContentKind::Text => {
            let escaped = entry.value.replace('\n', "\\n");
            if options.full || options.simple {
                escaped
            } else {
                escaped.chars().take(DISPLAY_TRUNCATE_CHARS).collect()
            }
        },
        ContentKind::Image if entry.is_missing_image() => {
            format!("{MISSING_IMAGE_PREFIX}{}", entry.value)
        },
        ContentKind::Image => format!("{IMAGE_PREFIX}{}", entry.value),
    }
}

/// One `list` output line.
#[must_use]
pub fn format_line(entry: &Entry, options: ListOptions) -> String {
    let display = display_value(entry, options);
    if options.simple {
        display
    } else {
        format!("{} [{}] {display}", entry.id, entry.kind.tag())
    }
}

/// Extracts the id from a line produced by [`format_line`].
///
/// Tolerates whitespace a picker may add around the id.
#[must_use]
pub fn parse_listing_id(line: &str) -> Option<EntryId> {
    LISTING_ID
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .map(EntryId::new)
}

/// Entries as a pretty JSON array.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(entries: &[Entry]) -> Result<String> {
    serde_json::to_string_pretty(entries).map_err(|e| Error::failed("render_json", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use test_case::test_case;

    fn entry(id: i64, kind: ContentKind, value: &str) -> Entry {
        Entry {
            id: EntryId::new(id),
            content_hash: "h".to_string(),
            kind,
            value: value.to_string(),
            last_seen: Utc::now(),
        }
    }

    #[test]
    fn test_text_line_escapes_newlines() {
        let e = entry(3, ContentKind::Text, "a\nb");
        assert_eq!(format_line(&e, ListOptions::default()), "3 [T] a\\nb");
    }

    #[test]
    fn test_truncation() {
        let long = "x".repeat(150);
        let e = entry(1, ContentKind::Text, &long);

        let default = display_value(&e, ListOptions::default());
        assert_eq!(default.chars().count(), DISPLAY_TRUNCATE_CHARS);

        let full = display_value(&e, ListOptions { full: true, ..ListOptions::default() });
        assert_eq!(full.len(), 150);

        let simple = format_line(&e, ListOptions { simple: true, ..ListOptions::default() });
        assert_eq!(simple, long);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let e = entry(1, ContentKind::Text, &"é".repeat(120));
        assert_eq!(display_value(&e, ListOptions::default()).chars().count(), 100);
    }

    #[test]
    fn test_image_lines() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("abc.png");
        std::fs::write(&path, b"png").unwrap();
        let present = entry(2, ContentKind::Image, path.to_str().unwrap());
        assert_eq!(
            format_line(&present, ListOptions::default()),
            format!("2 [I] [Image] {}", path.display())
        );

        let missing = entry(4, ContentKind::Image, "/nonexistent/x.png");
        assert_eq!(
            display_value(&missing, ListOptions::default()),
            "[Image] [Missing] /nonexistent/x.png"
        );
    }

    #[test_case("12 [T] hello", Some(12) ; "text line")]
    #[test_case("7 [I] [Image] /tmp/a.png", Some(7) ; "image line")]
    #[test_case("hello", None ; "no prefix")]
    #[test_case("12 hello", None ; "missing tag")]
    #[test_case(" 12  [T] hello", Some(12) ; "extra whitespace")]
    #[test_case("12 [I]", Some(12) ; "bare tag")]
    #[test_case("12 [t] hello", None ; "lowercase tag")]
    fn test_parse_listing_id(line: &str, expected: Option<i64>) {
        assert_eq!(parse_listing_id(line), expected.map(EntryId::new));
    }

    #[test]
    fn test_format_then_parse() {
        let e = entry(42, ContentKind::Text, "some\ntext");
        let line = format_line(&e, ListOptions::default());
        assert_eq!(parse_listing_id(&line), Some(EntryId::new(42)));
    }

    #[test]
    fn test_render_json() {
        let json = render_json(&[entry(1, ContentKind::Text, "hi")]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["id"], 1);
        assert_eq!(parsed[0]["kind"], "text");
        assert_eq!(parsed[0]["value"], "hi");
    }
}
