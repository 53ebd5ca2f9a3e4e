//! `list` command.

use crate::rendering::{ListOptions, format_line, render_json};
use crate::services::HistoryService;
use crate::storage::HistoryBackend;
use crate::{Error, Result};
use std::io::{self, Write};

/// Default number of entries listed.
pub const DEFAULT_LIST_LIMIT: usize = 50;

/// Arguments of `list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListArgs {
    /// Maximum entries to print.
    pub limit: usize,
    /// Line formatting.
    pub options: ListOptions,
    /// Print a JSON array instead of lines.
    pub json: bool,
}

impl Default for ListArgs {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIST_LIMIT,
            options: ListOptions::default(),
            json: false,
        }
    }
}

/// Writes the most recent entries to `out`, newest first.
///
/// A reader that closes the pipe early (a picker that exits after the first
/// screen) ends the listing without an error.
///
/// # Errors
///
/// Returns an error if the store cannot be read or `out` cannot be written.
pub fn cmd_list<S: HistoryBackend>(
    service: &HistoryService<S>,
    args: ListArgs,
    out: &mut dyn Write,
) -> Result<usize> {
    let entries = service.list(args.limit)?;

    let written = if args.json {
        writeln!(out, "{}", render_json(&entries)?)
    } else {
        entries
            .iter()
            .try_for_each(|entry| writeln!(out, "{}", format_line(entry, args.options)))
    };

    match written {
        Ok(()) => Ok(entries.len()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            tracing::debug!("List output closed early");
            Ok(entries.len())
        },
        Err(e) => Err(Error::failed("write_list", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClipConfig;
    use crate::models::Capture;
    use crate::storage::SqliteHistoryBackend;

    fn service(values: &[&str]) -> HistoryService {
        let service =
            HistoryService::new(SqliteHistoryBackend::in_memory().unwrap(), ClipConfig::default());
        for value in values {
            service.store().upsert(&Capture::text(*value), 100).unwrap();
        }
        service
    }

    fn run(service: &HistoryService, args: ListArgs) -> String {
        let mut out = Vec::new();
        cmd_list(service, args, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_default_lines() {
        let service = service(&["first", "second\nline"]);
        assert_eq!(run(&service, ListArgs::default()), "2 [T] second\\nline\n1 [T] first\n");
    }

    #[test]
    fn test_simple_lines() {
        let service = service(&["first", "second"]);
        let args = ListArgs {
            options: ListOptions {
                simple: true,
                full: false,
            },
            ..ListArgs::default()
        };
        assert_eq!(run(&service, args), "second\nfirst\n");
    }

    #[test]
    fn test_limit() {
        let service = service(&["a", "b", "c"]);
        let args = ListArgs {
            limit: 1,
            ..ListArgs::default()
        };
        assert_eq!(run(&service, args), "3 [T] c\n");
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_closed_pipe_is_not_an_error() {
        let service = service(&["a", "b"]);
        assert!(cmd_list(&service, ListArgs::default(), &mut ClosedPipe).is_ok());
    }

    #[test]
    fn test_json() {
        let service = service(&["a"]);
        let args = ListArgs {
            json: true,
            ..ListArgs::default()
        };
        let parsed: serde_json::Value = serde_json::from_str(&run(&service, args)).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 1);
    }
}
