//! Quality filter applied to whichever engine produced results.

use crate::types::SearchResult;

/// Drop results with short titles or non-HTTP URLs, preserving order.
///
/// See [`SearchResult::is_quality`] for the exact rule.
pub fn quality_filter(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let before = results.len();
    let kept: Vec<SearchResult> = results.into_iter().filter(SearchResult::is_quality).collect();
    if kept.len() < before {
        tracing::debug!(dropped = before - kept.len(), "low quality results filtered");
    }
    kept
}
