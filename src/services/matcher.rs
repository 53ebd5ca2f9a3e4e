//! Resolution of picker output back to a stored entry.
//!
//! A fuzzy picker hands back whatever line it displayed: the value with real
//! newlines escaped, possibly trimmed by the shell, possibly carrying an
//! `[Image] ` display prefix. [`LooseMatcher`] undoes those transformations
//! in order of decreasing confidence:
//!
//! 1. Literal candidates (raw and unescaped input, each trimmed and/or with a
//!    trailing newline), each looked up exactly and then whitespace-trimmed
//! 2. Image display prefixes stripped
//! 3. Substring containment over the most recent entries
//!
//! The first strategy that hits wins.

use crate::Result;
use crate::models::Entry;
use crate::rendering::{IMAGE_PREFIX, MISSING_IMAGE_PREFIX};
use crate::storage::HistoryBackend;
use tracing::instrument;

/// How many recent entries the substring fallback scans.
pub const SUBSTRING_SCAN_LIMIT: usize = 250;

/// Maps free-form picker output to a stored entry.
pub struct LooseMatcher<'a> {
    store: &'a dyn HistoryBackend,
}

impl<'a> LooseMatcher<'a> {
    /// Creates a matcher over `store`.
    #[must_use]
    pub fn new(store: &'a dyn HistoryBackend) -> Self {
        Self { store }
    }

    /// Resolves `input` to an entry.
    ///
    /// `Ok(None)` means no strategy matched; callers report that as "not
    /// found", not as a failure.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store cannot be queried.
    #[instrument(skip(self, input), fields(input_len = input.len()))]
    pub fn resolve(&self, input: &str) -> Result<Option<Entry>> {
        for candidate in literal_candidates(input) {
            if let Some(entry) = self.store.find_by_value(&candidate)? {
                tracing::debug!(id = %entry.id, strategy = "literal", "Resolved input");
                return Ok(Some(entry));
            }
        }

        if let Some(path) = strip_image_prefix(input)
            && let Some(entry) = self.store.find_by_value(path)?
        {
            tracing::debug!(id = %entry.id, strategy = "image_prefix", "Resolved input");
            return Ok(Some(entry));
        }

        let found = self.substring_fallback(input)?;
        if let Some(entry) = &found {
            tracing::debug!(id = %entry.id, strategy = "substring", "Resolved input");
        }
        Ok(found)
    }

    /// Most recent entry where either normalized string contains the other.
    ///
    /// Stored values that flatten to nothing (whitespace-only clips) are
    /// skipped. An empty string is a substring of every input, so without
    /// this guard any such clip would match whatever the picker returned.
    fn substring_fallback(&self, input: &str) -> Result<Option<Entry>> {
        let needle = input.replace('\r', "");
        let needle = needle.trim();
        if needle.is_empty() {
            return Ok(None);
        }

        let recent = self.store.list(SUBSTRING_SCAN_LIMIT)?;
        Ok(recent.into_iter().find(|entry| {
            let flattened = flatten_value(&entry.value);
            !flattened.is_empty() && (flattened.contains(needle) || needle.contains(&flattened))
        }))
    }
}

/// Literal lookup candidates, deduplicated, in preference order.
#[must_use]
pub fn literal_candidates(input: &str) -> Vec<String> {
    let unescaped = input.replace("\\n", "\n");
    let mut candidates: Vec<String> = Vec::with_capacity(8);

    for base in [input, unescaped.as_str()] {
        let trimmed = base.trim();
        for candidate in [
            base.to_string(),
            trimmed.to_string(),
            format!("{base}\n"),
            format!("{trimmed}\n"),
        ] {
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }

    candidates
}

/// Strips an image display prefix, returning the trimmed remainder.
///
/// The missing-file variant is longer and checked first.
#[must_use]
pub fn strip_image_prefix(input: &str) -> Option<&str> {
    input
        .strip_prefix(MISSING_IMAGE_PREFIX)
        .or_else(|| input.strip_prefix(IMAGE_PREFIX))
        .map(str::trim)
}

/// Stored value as a picker would display it: one line, no `\r`, trimmed.
fn flatten_value(value: &str) -> String {
    value
        .replace('\n', "\\n")
        .replace('\r', "")
        .trim()
        .to_string()
}
