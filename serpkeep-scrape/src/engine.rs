//! Trait definition for scrapeable search engines.
//!
//! Each engine (Google, Bing) implements [`Engine`] to provide a uniform
//! interface for building a results URL and turning the returned markup
//! into [`SearchResult`] values. Fetching is deliberately not part of the
//! trait: the orchestrator owns the [`crate::http::Fetcher`], the header
//! rotation, and the timeouts.

use crate::types::{SearchEngine, SearchResult};

/// A search engine whose results page can be scraped.
///
/// Implementors handle their own:
///
/// - URL construction with query encoding
/// - HTML parsing via CSS selectors
/// - URL cleaning for engine-specific redirect wrappers
///
/// All implementations must be `Send + Sync` so one instance can serve
/// concurrent requests.
pub trait Engine: Send + Sync {
    /// Returns which [`SearchEngine`] variant this implementation represents.
    fn engine_type(&self) -> SearchEngine;

    /// Build the results page URL for `query`, asking for up to
    /// `max_results` results.
    fn search_url(&self, query: &str, max_results: usize) -> String;

    /// Extract up to `max_results` results from a results page.
    ///
    /// Never fails: markup that cannot be walked yields an empty vector.
    fn extract(&self, markup: &[u8], max_results: usize) -> Vec<SearchResult>;
}
