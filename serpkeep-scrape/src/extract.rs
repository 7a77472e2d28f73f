//! Shared helpers for walking results pages.

use std::borrow::Cow;

use scraper::{ElementRef, Selector};

use crate::error::ExtractError;

/// Compile a CSS selector, mapping failures onto [`ExtractError`].
pub(crate) fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector(format!("{css}: {e:?}")))
}

/// Decode raw page bytes. Invalid UTF-8 sequences become U+FFFD rather
/// than aborting the parse.
pub(crate) fn decode(markup: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(markup)
}

/// Text of `element` with every text node trimmed and the pieces joined
/// without separators, the way the rendered page reads once whitespace
/// between inline elements is collapsed away.
pub(crate) fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// The first `max_chars` characters of `text`.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Truncate to `max_chars` characters, appending `...` when anything was cut.
pub(crate) fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    let head = truncate_chars(text, max_chars);
    if head.len() < text.len() {
        format!("{head}...")
    } else {
        head.to_owned()
    }
}

/// Nearest ancestor of `element` matching `selector`.
pub(crate) fn closest<'a>(element: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| selector.matches(ancestor))
}

/// Parent element of `element`, if it has one.
pub(crate) fn parent_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.parent().and_then(ElementRef::wrap)
}
