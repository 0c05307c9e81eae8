//! Small string helpers shared by the adapter

/// Truncate to at most `max_chars` characters, marking the cut with `...`
///
/// Works on `char` boundaries so provider bodies with accented text never
/// split a code point.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
        None => text.to_string(),
    }
}

/// Case-insensitive containment check for any of `needles`
#[must_use]
pub fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    let lower = haystack.to_lowercase();
    needles.iter().any(|needle| lower.contains(needle))
}
