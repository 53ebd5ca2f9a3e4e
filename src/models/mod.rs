//! Data models for clipboard history.

mod entry;

pub use entry::{Capture, ContentKind, Entry, EntryId};
