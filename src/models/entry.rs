//! Clipboard history entry types and identifiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Identifier of a history entry.
///
/// Assigned by the store on insert with auto-increment semantics: never reused,
/// even after the row is evicted, until a full clear resets the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(i64);

impl EntryId {
    /// Creates an entry ID from its raw value.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for EntryId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Kind of clipboard content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// UTF-8 text, stored literally.
    Text,
    /// Image bytes, stored as a file; the entry value is the file path.
    Image,
}

impl ContentKind {
    /// Returns the kind as stored in the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
        }
    }

    /// Parses a stored kind string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "image" => Some(Self::Image),
            _ => None,
        }
    }

    /// Single-letter tag used in list output (`T` / `I`).
    #[must_use]
    pub const fn tag(&self) -> char {
        match self {
            Self::Text => 'T',
            Self::Image => 'I',
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single row of clipboard history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Store-assigned identifier.
    pub id: EntryId,
    /// SHA-256 hex digest of the raw captured bytes. Unique across entries.
    pub content_hash: String,
    /// Text or image.
    pub kind: ContentKind,
    /// Literal text, or the path of the image file.
    pub value: String,
    /// Capture time, bumped whenever identical content is observed again.
    pub last_seen: DateTime<Utc>,
}

impl Entry {
    /// Returns the image path for image entries.
    #[must_use]
    pub fn image_path(&self) -> Option<&Path> {
        match self.kind {
            ContentKind::Image => Some(Path::new(&self.value)),
            ContentKind::Text => None,
        }
    }

    /// Returns true when this is an image entry whose backing file is gone.
    #[must_use]
    pub fn is_missing_image(&self) -> bool {
        self.image_path().is_some_and(|path| !path.exists())
    }
}

/// Content fetched from the clipboard, ready to be upserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    /// Literal text, or the path the image was materialized to.
    pub value: String,
    /// Text or image.
    pub kind: ContentKind,
    /// Hash of the raw fetched bytes.
    pub content_hash: String,
}

impl Capture {
    /// Creates a text capture, hashing the UTF-8 encoding of `text`.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        let value = text.into();
        let content_hash = crate::services::ContentHasher::hash(value.as_bytes());
        Self {
            value,
            kind: ContentKind::Text,
            content_hash,
        }
    }

    /// Creates an image capture for a file that has already been materialized.
    #[must_use]
    pub fn image(path: impl AsRef<Path>, content_hash: impl Into<String>) -> Self {
        Self {
            value: path.as_ref().to_string_lossy().into_owned(),
            kind: ContentKind::Image,
            content_hash: content_hash.into(),
        }
    }
}
