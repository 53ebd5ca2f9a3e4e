//! Classification of clipboard targets (MIME types / X11 atoms).

/// Targets set by password managers to ask history tools not to record.
pub const SENSITIVE_TARGETS: [&str; 2] = ["x-kde-passwordManagerHint", "CLIPBOARD_MANAGER_HINT_SECRET"];

/// Targets that carry plain text.
pub const TEXT_TARGETS: [&str; 4] = [
    "text/plain",
    "text/plain;charset=utf-8",
    "UTF8_STRING",
    "STRING",
];

/// What the clipboard currently offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipTargets {
    /// Marked sensitive; never captured.
    Sensitive,
    /// Text is available. `image` is set when an image is offered too.
    Text {
        /// Image MIME type to fall back to if reading text fails.
        image: Option<String>,
    },
    /// Only an image is available, with this MIME type.
    Image(String),
    /// Nothing capturable.
    Empty,
}

/// Classifies the advertised targets. Sensitive markers win over everything,
/// then text, then the first `image/*` type.
#[must_use]
pub fn classify_targets<S: AsRef<str>>(targets: &[S]) -> ClipTargets {
    let has = |name: &str| targets.iter().any(|t| t.as_ref() == name);

    if SENSITIVE_TARGETS.iter().any(|s| has(s)) {
        return ClipTargets::Sensitive;
    }

    let image = targets
        .iter()
        .map(AsRef::as_ref)
        .find(|t| t.starts_with("image/"))
        .map(str::to_string);

    if TEXT_TARGETS.iter().any(|t| has(t)) {
        return ClipTargets::Text { image };
    }

    image.map_or(ClipTargets::Empty, ClipTargets::Image)
}

/// Splits tool output into one target per non-empty line.
#[must_use]
pub fn parse_target_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
