#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use itertools::Itertools;

/// Lowercases `text`, strips it, and collapses every run of whitespace into a
/// single space. `None` passes through unchanged.
pub fn normalize(text: Option<&str>) -> Option<String> {
    text.map(|t| t.to_lowercase().split_whitespace().join(" "))
}

/// Counts whitespace-separated words; a missing answer has no words.
pub fn count_words(text: Option<&str>) -> usize {
    text.map_or(0, |t| t.split_whitespace().count())
}
