//! Character-boundary string helpers.

/// The first `max` characters of `s`, never splitting a UTF-8 sequence.
pub(crate) fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
