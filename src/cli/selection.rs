//! Target selection for `recall` and `delete`.
//!
//! Either an explicit id, or a line piped from a picker such as
//! `clipstash list | fzf | clipstash recall`.

use crate::models::EntryId;
use crate::rendering::parse_listing_id;
use crate::{Error, Result};
use std::io::{IsTerminal, Read};

/// What the user picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// An id given on the command line.
    Id(EntryId),
    /// A line read from stdin. `id` is set when it starts with a listing prefix.
    Line {
        /// Id parsed from a `<id> [T] ` prefix.
        id: Option<EntryId>,
        /// The line, trailing newlines removed.
        line: String,
    },
    /// Stdin was empty (the picker was cancelled).
    Nothing,
}

/// Builds a selection from raw stdin contents.
///
/// Only trailing newlines are stripped; leading whitespace can be part of
/// the clip.
#[must_use]
pub fn selection_from_input(raw: &str) -> Selection {
    let line = raw.trim_end_matches(['\n', '\r']);
    if line.is_empty() {
        return Selection::Nothing;
    }
    Selection::Line {
        id: parse_listing_id(line),
        line: line.to_string(),
    }
}

/// Uses `explicit` if given, otherwise reads the selection from stdin.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if no id was given and stdin is a terminal,
/// or if stdin cannot be read.
pub fn read_selection(explicit: Option<i64>) -> Result<Selection> {
    if let Some(id) = explicit {
        return Ok(Selection::Id(EntryId::new(id)));
    }

    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Err(Error::InvalidInput(
            "give a clip ID or pipe a line from 'clipstash list'".to_string(),
        ));
    }

    let mut raw = String::new();
    stdin
        .read_to_string(&mut raw)
        .map_err(|e| Error::InvalidInput(format!("cannot read stdin: {e}")))?;
    Ok(selection_from_input(&raw))
}
