//! Human-facing rendering of history entries.

mod list;

pub use list::{
    DISPLAY_TRUNCATE_CHARS, IMAGE_PREFIX, ListOptions, MISSING_IMAGE_PREFIX, display_value,
    format_line, parse_listing_id, render_json,
};
