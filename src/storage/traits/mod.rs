//! Storage backend traits.

mod history;

pub use history::{HistoryBackend, UpsertOutcome};
