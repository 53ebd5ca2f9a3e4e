//! History backend implementations.

mod sqlite;

pub use sqlite::{Clock, SqliteHistoryBackend};
