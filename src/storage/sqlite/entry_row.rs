//! Row conversion for history entries.

use crate::models::{ContentKind, Entry, EntryId};
use chrono::{DateTime, Utc};
use rusqlite::Row;
use rusqlite::types::Type;

/// Column list matching [`entry_from_row`].
pub const ENTRY_COLUMNS: &str = "id, content_hash, kind, value, last_seen";

/// Characters stripped by loose value comparison, on both sides of the query.
pub const TRIM_CHARS: [char; 4] = [' ', '\t', '\n', '\r'];

/// `SQLite` expression trimming `value` by [`TRIM_CHARS`].
pub const TRIMMED_VALUE_SQL: &str = "TRIM(value, ' ' || char(9) || char(10) || char(13))";

/// Trims `s` by [`TRIM_CHARS`], matching [`TRIMMED_VALUE_SQL`].
#[must_use]
pub fn trim_value(s: &str) -> &str {
    s.trim_matches(TRIM_CHARS.as_slice())
}

/// Converts a stored timestamp (milliseconds since epoch) to UTC.
#[must_use]
pub fn millis_to_datetime(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ms).unwrap_or_default()
}

/// Builds an [`Entry`] from a row selected with [`ENTRY_COLUMNS`].
///
/// # Errors
///
/// Fails if a column is missing or the stored kind is unknown.
pub fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<Entry> {
    let kind_str: String = row.get(2)?;
    let kind = ContentKind::parse(&kind_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            Type::Text,
            Box::new(crate::Error::InvalidInput(format!(
                "unknown content kind '{kind_str}'"
            ))),
        )
    })?;

    Ok(Entry {
        id: EntryId::new(row.get(0)?),
        content_hash: row.get(1)?,
        kind,
        value: row.get(3)?,
        last_seen: millis_to_datetime(row.get(4)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_trim_value_matches_sql_trim() {
        let conn = Connection::open_in_memory().unwrap();
        for raw in ["  hi  ", "\thi\r\n", "hi", " \n ", "a b\n"] {
            let sql: String = conn
                .query_row(
                    &format!("SELECT {}", TRIMMED_VALUE_SQL.replace("value", "?1")),
                    [raw],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(sql, trim_value(raw), "input {raw:?}");
        }
    }

    #[test]
    fn test_millis_roundtrip() {
        let dt = millis_to_datetime(1_700_000_000_123);
        assert_eq!(dt.timestamp_millis(), 1_700_000_000_123);
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.query_row(
            "SELECT 1, 'h', 'video', 'v', 0",
            [],
            entry_from_row,
        );
        assert!(result.is_err());
    }
}
