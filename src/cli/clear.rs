//! `clear` command.

use crate::Result;
use crate::services::HistoryService;
use crate::storage::HistoryBackend;

/// Removes every clip, or only clips whose value matches `pattern`.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidPattern`] before deleting anything if
/// `pattern` does not compile.
pub fn cmd_clear<S: HistoryBackend>(
    service: &HistoryService<S>,
    pattern: Option<&str>,
) -> Result<usize> {
    service.clear(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::config::ClipConfig;
    use crate::models::Capture;
    use crate::storage::SqliteHistoryBackend;

    #[test]
    fn test_clear_with_pattern() {
        let service =
            HistoryService::new(SqliteHistoryBackend::in_memory().unwrap(), ClipConfig::default());
        for value in ["foo", "bar", "foobar"] {
            service.store().upsert(&Capture::text(value), 100).unwrap();
        }

        assert_eq!(cmd_clear(&service, Some("foo.*")).unwrap(), 2);
        assert!(matches!(
            cmd_clear(&service, Some("[")),
            Err(Error::InvalidPattern { .. })
        ));
        assert_eq!(cmd_clear(&service, None).unwrap(), 1);
    }
}
