//! Storage layer.
//!
//! - [`traits::HistoryBackend`]: the persistent history contract
//! - [`history::SqliteHistoryBackend`]: `SQLite` implementation with dedup and eviction
//! - [`images::ImageStore`]: content-addressed image files referenced by image rows

// Allow significant_drop_tightening - the connection guard lives for the whole
// transaction.
#![allow(clippy::significant_drop_tightening)]

pub mod history;
pub mod images;
pub mod sqlite;
pub mod traits;

pub use history::SqliteHistoryBackend;
pub use images::{FileCleanup, ImageStore, remove_image_file};
pub use traits::{HistoryBackend, UpsertOutcome};
