//! Shared connection handling for the `SQLite` history store.
//!
//! Provides mutex acquisition with poison recovery, pragma configuration, and
//! the immediate-transaction wrapper every mutating store operation runs in.

use crate::{Error, Result};
use rusqlite::{Connection, ErrorCode};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// `busy_timeout` applied to every connection, in milliseconds.
pub const BUSY_TIMEOUT_MS: u32 = 5000;

/// Attempts at `BEGIN IMMEDIATE` before giving up on a busy database.
const BEGIN_ATTEMPTS: u32 = 3;

/// Helper to acquire mutex lock with poison recovery.
///
/// If the mutex is poisoned (a panic inside a previous critical section), the
/// inner value is recovered and a warning logged. Every write runs inside a
/// transaction that is rolled back on error, so the connection is still usable.
pub fn acquire_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("SQLite mutex was poisoned, recovering");
            metrics::counter!("sqlite_mutex_poison_recovery_total").increment(1);
            poisoned.into_inner()
        },
    }
}

/// Configures a `SQLite` connection for multi-process access.
///
/// # Configuration Applied
///
/// - **WAL mode**: readers (`list`) never block the capture path
/// - **NORMAL synchronous**: durable across application crashes
/// - **`busy_timeout`**: a capture racing a CLI `delete` waits for the write
///   lock instead of failing with `SQLITE_BUSY`
///
/// The daemon and one-shot CLI invocations are separate processes, so all
/// write serialization happens here in the database, not in-process.
///
/// # Errors
///
/// Returns [`Error::StoreUnavailable`] if the busy timeout cannot be applied.
pub fn configure_connection(conn: &Connection) -> Result<()> {
    // journal_mode returns a row ("wal"), which execute_batch would reject
    let _ = conn.pragma_update(None, "journal_mode", "WAL");
    let _ = conn.pragma_update(None, "synchronous", "NORMAL");
    conn.busy_timeout(Duration::from_millis(u64::from(BUSY_TIMEOUT_MS)))
        .map_err(|e| Error::store("configure_connection", e))?;

    Ok(())
}

/// Returns true if `err` is `SQLITE_BUSY` / `SQLITE_LOCKED`.
#[must_use]
pub fn is_busy(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::DatabaseBusy || e.code == ErrorCode::DatabaseLocked
    )
}

/// Runs `op` inside a `BEGIN IMMEDIATE` transaction.
///
/// `BEGIN IMMEDIATE` takes the database write lock up front, so two processes
/// upserting the same content cannot both read "no row" and both insert. When
/// the lock is still held after `busy_timeout`, the begin is retried a bounded
/// number of times. `op`'s error rolls the transaction back.
///
/// # Errors
///
/// Returns [`Error::StoreUnavailable`] if the transaction cannot be started or
/// committed, or whatever error `op` returned.
pub fn with_immediate_transaction<T>(
    conn: &Connection,
    operation: &'static str,
    op: impl FnOnce(&Connection) -> Result<T>,
) -> Result<T> {
    let mut attempt = 1;
    loop {
        match conn.execute_batch("BEGIN IMMEDIATE") {
            Ok(()) => break,
            Err(e) if is_busy(&e) && attempt < BEGIN_ATTEMPTS => {
                tracing::warn!(operation, attempt, "History database busy, retrying");
                metrics::counter!("sqlite_busy_retries_total", "operation" => operation)
                    .increment(1);
                std::thread::sleep(Duration::from_millis(50 * u64::from(attempt)));
                attempt += 1;
            },
            Err(e) => return Err(Error::store(operation, e)),
        }
    }

    match op(conn) {
        Ok(value) => {
            if let Err(e) = conn.execute_batch("COMMIT") {
                let _ = conn.execute_batch("ROLLBACK");
                return Err(Error::store(operation, e));
            }
            Ok(value)
        },
        Err(e) => {
            let _ = conn.execute_batch("ROLLBACK");
            Err(e)
        },
    }
}
