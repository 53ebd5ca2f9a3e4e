//! # Clipstash
//!
//! A clipboard history manager for Linux desktop sessions.
//!
//! Clipstash watches the clipboard (Wayland or X11), keeps a deduplicated,
//! size-bounded history of text and image clips in `SQLite`, and restores or
//! deletes past clips, including clips selected through an external fuzzy picker
//! whose output line may have been escaped, trimmed, or prefixed.
//!
//! ## Architecture
//!
//! - [`services::ContentHasher`] content-addresses captured bytes (SHA-256 hex)
//! - [`storage::SqliteHistoryBackend`] owns the history table, deduplication and
//!   retention eviction
//! - [`services::LooseMatcher`] maps picker output back to a stored entry
//! - [`backend::ClipboardBackend`] is the capability contract implemented by the
//!   Wayland and X11 tool wrappers
//!
//! ## Example
//!
//! ```rust,ignore
//! use clipstash::services::HistoryService;
//! use clipstash::storage::SqliteHistoryBackend;
//!
//! let store = SqliteHistoryBackend::new("history.db")?;
//! let service = HistoryService::new(store, config);
//! service.capture(&backend)?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;
use thiserror::Error as ThisError;

// Module declarations
pub mod backend;
pub mod cli;
pub mod config;
pub mod daemon;
pub mod models;
pub mod observability;
pub mod rendering;
pub mod services;
pub mod storage;

// Re-exports for convenience
pub use config::ClipConfig;
pub use models::{Capture, ContentKind, Entry, EntryId};
pub use services::{ContentHasher, HistoryService, LooseMatcher};
pub use storage::{HistoryBackend, ImageStore, SqliteHistoryBackend};

/// Error type for clipstash operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `NoBackendAvailable` | Neither `wl-clipboard` nor `xclip` is usable at startup |
/// | `StoreUnavailable` | The history database cannot be opened, read or written |
/// | `InvalidPattern` | `clear` was given a regex that does not compile |
/// | `NotFound` | A recall/delete target does not resolve to a stored clip |
/// | `MissingImageFile` | An image clip exists but its backing file is gone |
/// | `InvalidInput` | Malformed arguments or config values |
/// | `OperationFailed` | Clipboard tool invocation, config or lock-file I/O fails |
#[derive(Debug, ThisError)]
pub enum Error {
    /// No usable clipboard backend was found.
    ///
    /// Fatal at startup; retrying will not help until the session or the
    /// installed tools change.
    #[error("no clipboard backend available: {0}")]
    NoBackendAvailable(String),

    /// The persistent history store failed.
    ///
    /// Raised when:
    /// - The database file cannot be opened or its schema created
    /// - A query or transaction fails
    #[error("history store unavailable during '{operation}': {cause}")]
    StoreUnavailable {
        /// The store operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// A clear pattern failed to compile. Nothing was deleted.
    #[error("invalid pattern '{pattern}': {cause}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Compiler message.
        cause: String,
    },

    /// The requested clip does not exist.
    #[error("clip not found: {0}")]
    NotFound(String),

    /// The clip exists but its image file has been removed (e.g. temp dir wiped on reboot).
    #[error("image file for clip {id} is missing: {}", path.display())]
    MissingImageFile {
        /// The clip id.
        id: EntryId,
        /// Where the image was expected.
        path: PathBuf,
    },

    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - A clipboard tool (`wl-copy`, `xclip`, ...) cannot be spawned or exits non-zero
    /// - The config file cannot be read or parsed
    /// - The daemon lock file cannot be opened
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

impl Error {
    /// Builds a [`Error::StoreUnavailable`] from any displayable cause.
    pub fn store(operation: &str, cause: impl std::fmt::Display) -> Self {
        Self::StoreUnavailable {
            operation: operation.to_string(),
            cause: cause.to_string(),
        }
    }

    /// Builds a [`Error::OperationFailed`] from any displayable cause.
    pub fn failed(operation: &str, cause: impl std::fmt::Display) -> Self {
        Self::OperationFailed {
            operation: operation.to_string(),
            cause: cause.to_string(),
        }
    }

    /// Returns true for lookup misses that are reported to the user but are
    /// not failures of the command itself.
    #[must_use]
    pub const fn is_expected_miss(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::MissingImageFile { .. })
    }
}

/// Result type alias for clipstash operations.
pub type Result<T> = std::result::Result<T, Error>;
