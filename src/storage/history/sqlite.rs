//! `SQLite`-backed clip history.
//!
//! Owns the `entries` table: content-hash deduplication, retention eviction,
//! and the lookups used by recall and delete.

use crate::models::{Capture, ContentKind, Entry, EntryId};
use crate::storage::images::remove_image_file;
use crate::storage::sqlite::{
    ENTRY_COLUMNS, TRIMMED_VALUE_SQL, acquire_lock, configure_connection, entry_from_row,
    record_operation_metrics, status_label, trim_value, with_immediate_transaction,
};
use crate::storage::traits::{HistoryBackend, UpsertOutcome};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use rusqlite::{Connection, OptionalExtension, params};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::instrument;

const BACKEND: &str = "sqlite_history";

/// Source of `last_seen` timestamps.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// `SQLite`-backed clip history.
///
/// # Concurrency Model
///
/// The capture daemon and CLI invocations open the same database file from
/// different processes. Every mutation runs inside `BEGIN IMMEDIATE`, so the
/// "look up hash, then insert or refresh" sequence and the eviction that
/// follows are serialized by `SQLite`'s write lock. Readers use WAL snapshots
/// and never block the writer.
///
/// # Schema
///
/// ```sql
/// entries(id INTEGER PRIMARY KEY AUTOINCREMENT,
///         content_hash TEXT NOT NULL UNIQUE,
///         kind TEXT NOT NULL,
///         value TEXT NOT NULL,
///         last_seen INTEGER NOT NULL)  -- milliseconds since epoch
/// ```
///
/// `AUTOINCREMENT` keeps ids from being reused after eviction or a pattern
/// clear; a full clear resets the sequence explicitly.
///
/// Image files of deleted or evicted rows are removed only after the
/// transaction commits, so a rolled-back mutation leaves both rows and files
/// in place.
pub struct SqliteHistoryBackend {
    /// Protected by Mutex because `rusqlite::Connection` is not `Sync`.
    conn: Mutex<Connection>,
    /// Path to the database (None for in-memory).
    db_path: Option<PathBuf>,
    clock: Clock,
}

impl fmt::Debug for SqliteHistoryBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteHistoryBackend")
            .field("db_path", &self.db_path)
            .finish_non_exhaustive()
    }
}

impl SqliteHistoryBackend {
    /// Opens (creating if needed) the history database at `db_path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`] if the database cannot be opened or
    /// its schema created.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// use clipstash::storage::SqliteHistoryBackend;
    ///
    /// let store = SqliteHistoryBackend::new("/tmp/history.db")?;
    /// # Ok::<(), clipstash::Error>(())
    /// ```
    pub fn new(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        let conn = Connection::open(&db_path).map_err(|e| Error::store("open_sqlite", e))?;

        let backend = Self {
            conn: Mutex::new(conn),
            db_path: Some(db_path),
            clock: Arc::new(Utc::now),
        };
        backend.initialize()?;
        Ok(backend)
    }

    /// Creates an in-memory history (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`] if the schema cannot be created.
    pub fn in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| Error::store("open_sqlite_in_memory", e))?;

        let backend = Self {
            conn: Mutex::new(conn),
            db_path: None,
            clock: Arc::new(Utc::now),
        };
        backend.initialize()?;
        Ok(backend)
    }

    /// Replaces the timestamp source.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the database path (None for in-memory).
    #[must_use]
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn initialize(&self) -> Result<()> {
        let conn = acquire_lock(&self.conn);
        configure_connection(&conn)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content_hash TEXT NOT NULL UNIQUE,
                kind TEXT NOT NULL,
                value TEXT NOT NULL,
                last_seen INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_entries_last_seen ON entries(last_seen, id);
            CREATE INDEX IF NOT EXISTS idx_entries_value ON entries(value);",
        )
        .map_err(|e| Error::store("create_entries_table", e))?;

        Ok(())
    }

    fn now_millis(&self) -> i64 {
        (self.clock)().timestamp_millis()
    }

    /// Removes image files orphaned by a committed transaction. Best effort.
    fn remove_files(files: &[PathBuf]) {
        for path in files {
            remove_image_file(path);
        }
    }

    /// The backing file of a row, if it is an image row.
    fn image_file(kind: ContentKind, value: &str) -> Option<PathBuf> {
        (kind == ContentKind::Image).then(|| PathBuf::from(value))
    }

    fn upsert_in_tx(
        conn: &Connection,
        capture: &Capture,
        now: i64,
        retention_cap: usize,
    ) -> Result<(UpsertOutcome, Vec<PathBuf>)> {
        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM entries WHERE content_hash = ?1",
                params![capture.content_hash],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| Error::store("upsert_lookup", e))?;

        if let Some(id) = existing {
            conn.execute(
                "UPDATE entries SET last_seen = ?1 WHERE id = ?2",
                params![now, id],
            )
            .map_err(|e| Error::store("upsert_refresh", e))?;
            return Ok((
                UpsertOutcome::Refreshed {
                    id: EntryId::new(id),
                },
                Vec::new(),
            ));
        }

        conn.execute(
            "INSERT INTO entries (content_hash, kind, value, last_seen) VALUES (?1, ?2, ?3, ?4)",
            params![capture.content_hash, capture.kind.as_str(), capture.value, now],
        )
        .map_err(|e| Error::store("upsert_insert", e))?;
        let id = EntryId::new(conn.last_insert_rowid());

        let (evicted, files) = Self::evict_in_tx(conn, retention_cap)?;
        Ok((UpsertOutcome::Inserted { id, evicted }, files))
    }

    /// Trims the table to `retention_cap` rows, oldest first.
    ///
    /// Returns the evicted ids and the image files they referenced; the files
    /// are removed by the caller once the transaction has committed.
    fn evict_in_tx(
        conn: &Connection,
        retention_cap: usize,
    ) -> Result<(Vec<EntryId>, Vec<PathBuf>)> {
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))
            .map_err(|e| Error::store("evict_count", e))?;
        let cap = i64::try_from(retention_cap.max(1)).unwrap_or(i64::MAX);
        let excess = count - cap;
        if excess <= 0 {
            return Ok((Vec::new(), Vec::new()));
        }

        let mut stmt = conn
            .prepare(
                "SELECT id, kind, value FROM entries
                 ORDER BY last_seen ASC, id ASC LIMIT ?1",
            )
            .map_err(|e| Error::store("evict_select", e))?;
        let victims: Vec<(i64, String, String)> = stmt
            .query_map(params![excess], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .map_err(|e| Error::store("evict_select", e))?
            .collect::<rusqlite::Result<_>>()
            .map_err(|e| Error::store("evict_select", e))?;

        let mut evicted = Vec::with_capacity(victims.len());
        let mut files = Vec::new();
        for (id, kind, value) in victims {
            if ContentKind::parse(&kind) == Some(ContentKind::Image) {
                files.push(PathBuf::from(value));
            }
            conn.execute("DELETE FROM entries WHERE id = ?1", params![id])
                .map_err(|e| Error::store("evict_delete", e))?;
            evicted.push(EntryId::new(id));
        }

        tracing::debug!(evicted = evicted.len(), "Evicted oldest entries");
        metrics::counter!("history_evictions_total").increment(evicted.len() as u64);
        Ok((evicted, files))
    }

    fn select_all_values(
        conn: &Connection,
        operation: &str,
    ) -> Result<Vec<(i64, ContentKind, String)>> {
        let mut stmt = conn
            .prepare("SELECT id, kind, value FROM entries")
            .map_err(|e| Error::store(operation, e))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
            })
            .map_err(|e| Error::store(operation, e))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::store(operation, e))?;

        Ok(rows
            .into_iter()
            .map(|(id, kind, value)| {
                (id, ContentKind::parse(&kind).unwrap_or(ContentKind::Text), value)
            })
            .collect())
    }

    fn clear_all_in_tx(conn: &Connection) -> Result<(usize, Vec<PathBuf>)> {
        let rows = Self::select_all_values(conn, "clear_select")?;
        let files: Vec<PathBuf> = rows
            .into_iter()
            .filter_map(|(_, kind, value)| Self::image_file(kind, &value))
            .collect();

        let removed = conn
            .execute("DELETE FROM entries", [])
            .map_err(|e| Error::store("clear_delete", e))?;
        conn.execute("DELETE FROM sqlite_sequence WHERE name = 'entries'", [])
            .map_err(|e| Error::store("clear_reset_sequence", e))?;
        Ok((removed, files))
    }

    fn clear_matching_in_tx(conn: &Connection, regex: &Regex) -> Result<(usize, Vec<PathBuf>)> {
        let rows = Self::select_all_values(conn, "clear_select")?;
        let mut removed = 0;
        let mut files = Vec::new();
        for (id, kind, value) in rows {
            if !regex.is_match(&value) {
                continue;
            }
            removed += conn
                .execute("DELETE FROM entries WHERE id = ?1", params![id])
                .map_err(|e| Error::store("clear_delete", e))?;
            files.extend(Self::image_file(kind, &value));
        }
        Ok((removed, files))
    }

    fn query_one(
        conn: &Connection,
        sql: &str,
        value: &str,
        operation: &str,
    ) -> Result<Option<Entry>> {
        conn.query_row(sql, params![value], entry_from_row)
            .optional()
            .map_err(|e| Error::store(operation, e))
    }
}

impl HistoryBackend for SqliteHistoryBackend {
    #[instrument(
        skip(self, capture),
        fields(operation = "upsert", kind = %capture.kind, hash = %capture.content_hash)
    )]
    fn upsert(&self, capture: &Capture, retention_cap: usize) -> Result<UpsertOutcome> {
        let start = Instant::now();
        let now = self.now_millis();
        let result = {
            let conn = acquire_lock(&self.conn);
            with_immediate_transaction(&conn, "upsert", |conn| {
                Self::upsert_in_tx(conn, capture, now, retention_cap)
            })
        }
        .map(|(outcome, files)| {
            Self::remove_files(&files);
            outcome
        });

        if let Ok(outcome) = &result {
            tracing::debug!(id = %outcome.id(), inserted = outcome.is_inserted(), "Recorded capture");
        }
        record_operation_metrics(BACKEND, "upsert", start, status_label(&result));
        result
    }

    #[instrument(skip(self), fields(operation = "list"))]
    fn list(&self, limit: usize) -> Result<Vec<Entry>> {
        let start = Instant::now();
        let result: Result<Vec<Entry>> = (|| {
            let conn = acquire_lock(&self.conn);
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {ENTRY_COLUMNS} FROM entries
                     ORDER BY last_seen DESC, id DESC LIMIT ?1"
                ))
                .map_err(|e| Error::store("list", e))?;
            let limit = i64::try_from(limit).unwrap_or(i64::MAX);
            let entries = stmt
                .query_map(params![limit], entry_from_row)
                .map_err(|e| Error::store("list", e))?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(|e| Error::store("list", e))?;
            Ok(entries)
        })();

        record_operation_metrics(BACKEND, "list", start, status_label(&result));
        result
    }

    #[instrument(skip(self), fields(operation = "get", id = %id))]
    fn get(&self, id: EntryId) -> Result<Option<Entry>> {
        let start = Instant::now();
        let result = {
            let conn = acquire_lock(&self.conn);
            conn.query_row(
                &format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ?1"),
                params![id.get()],
                entry_from_row,
            )
            .optional()
            .map_err(|e| Error::store("get", e))
        };

        record_operation_metrics(BACKEND, "get", start, status_label(&result));
        result
    }

    #[instrument(skip(self), fields(operation = "delete", id = %id))]
    fn delete(&self, id: EntryId) -> Result<bool> {
        let start = Instant::now();
        let result = {
            let conn = acquire_lock(&self.conn);
            with_immediate_transaction(&conn, "delete", |conn| {
                let row: Option<(String, String)> = conn
                    .query_row(
                        "SELECT kind, value FROM entries WHERE id = ?1",
                        params![id.get()],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )
                    .optional()
                    .map_err(|e| Error::store("delete_lookup", e))?;

                let Some((kind, value)) = row else {
                    return Ok((false, None));
                };
                let deleted = conn
                    .execute("DELETE FROM entries WHERE id = ?1", params![id.get()])
                    .map_err(|e| Error::store("delete", e))?;
                let file = ContentKind::parse(&kind).and_then(|kind| Self::image_file(kind, &value));
                Ok((deleted > 0, file))
            })
        }
        .map(|(deleted, file)| {
            Self::remove_files(file.as_slice());
            deleted
        });

        record_operation_metrics(BACKEND, "delete", start, status_label(&result));
        result
    }

    #[instrument(skip(self), fields(operation = "clear"))]
    fn clear(&self, pattern: Option<&str>) -> Result<usize> {
        // Compile before touching the store so a bad pattern deletes nothing
        let regex = pattern
            .map(|p| {
                Regex::new(p).map_err(|e| Error::InvalidPattern {
                    pattern: p.to_string(),
                    cause: e.to_string(),
                })
            })
            .transpose()?;

        let start = Instant::now();
        let result = {
            let conn = acquire_lock(&self.conn);
            with_immediate_transaction(&conn, "clear", |conn| match &regex {
                Some(regex) => Self::clear_matching_in_tx(conn, regex),
                None => Self::clear_all_in_tx(conn),
            })
        }
        .map(|(removed, files)| {
            Self::remove_files(&files);
            removed
        });

        if let Ok(removed) = &result {
            tracing::info!(removed = *removed, filtered = regex.is_some(), "Cleared history");
        }
        record_operation_metrics(BACKEND, "clear", start, status_label(&result));
        result
    }

    #[instrument(skip(self, candidate), fields(operation = "find_by_value"))]
    fn find_by_value(&self, candidate: &str) -> Result<Option<Entry>> {
        let start = Instant::now();
        let result: Result<Option<Entry>> = (|| {
            let conn = acquire_lock(&self.conn);
            let exact = Self::query_one(
                &conn,
                &format!(
                    "SELECT {ENTRY_COLUMNS} FROM entries WHERE value = ?1
                     ORDER BY last_seen DESC, id DESC LIMIT 1"
                ),
                candidate,
                "find_by_value_exact",
            )?;
            if exact.is_some() {
                return Ok(exact);
            }

            Self::query_one(
                &conn,
                &format!(
                    "SELECT {ENTRY_COLUMNS} FROM entries WHERE {TRIMMED_VALUE_SQL} = ?1
                     ORDER BY last_seen DESC, id DESC LIMIT 1"
                ),
                trim_value(candidate),
                "find_by_value_trimmed",
            )
        })();

        record_operation_metrics(BACKEND, "find_by_value", start, status_label(&result));
        result
    }

    fn count(&self) -> Result<usize> {
        let conn = acquire_lock(&self.conn);
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))
            .map_err(|e| Error::store("count", e))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}
