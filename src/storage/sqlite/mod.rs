//! Shared `SQLite` infrastructure for the history store.
//!
//! - [`connection`]: mutex handling, pragmas, immediate transactions with busy retry
//! - [`entry_row`]: row conversion and loose-comparison trimming
//! - [`metrics`]: operation metrics

mod connection;
mod entry_row;
mod metrics;

pub use connection::{
    BUSY_TIMEOUT_MS, acquire_lock, configure_connection, is_busy, with_immediate_transaction,
};
pub use entry_row::{
    ENTRY_COLUMNS, TRIM_CHARS, TRIMMED_VALUE_SQL, entry_from_row, millis_to_datetime, trim_value,
};
pub use metrics::{record_operation_metrics, status_label};
