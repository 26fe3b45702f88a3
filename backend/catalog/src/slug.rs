use std::sync::LazyLock;

use regex::Regex;

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("separator pattern is valid"));

/// Canonical comparison key for a title or name.
///
/// Lowercases the label, collapses every run of characters outside `[a-z0-9]` into a
/// single `-` and trims hyphens from both ends. Total over any input.
pub fn slug(label: &str) -> String {
    let lowered = label.to_lowercase();

    SEPARATORS
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}
