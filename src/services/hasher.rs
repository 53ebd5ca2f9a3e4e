//! Content hashing for clipboard deduplication.
//!
//! Every captured clip is addressed by the SHA-256 digest of its raw bytes.
//! The digest is both the uniqueness key of the history table and the file
//! name of stored images, so it must be computed over exactly the bytes that
//! were fetched: UTF-8 for text, the undecoded clipboard payload for images.

use sha2::{Digest, Sha256};

/// Content hasher for clipboard payloads.
///
/// Unlike text search hashing, no normalization happens here: two clips that
/// differ only in whitespace are distinct clipboard states.
///
/// # Example
///
/// ```rust
/// use clipstash::services::ContentHasher;
///
/// let hash = ContentHasher::hash(b"hello");
/// assert_eq!(hash.len(), 64);
/// assert_ne!(hash, ContentHasher::hash(b"hello "));
/// ```
pub struct ContentHasher;

impl ContentHasher {
    /// Computes the lowercase hex-encoded SHA-256 digest of `bytes`.
    #[must_use]
    pub fn hash(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        hex::encode(hasher.finalize())
    }

    /// Hashes the UTF-8 encoding of `text`.
    #[must_use]
    pub fn hash_text(text: &str) -> String {
        Self::hash(text.as_bytes())
    }
}
