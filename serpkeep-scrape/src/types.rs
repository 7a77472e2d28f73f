//! Core types for scraped results and engine identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single result scraped from a search engine results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The title of the result page.
    pub title: String,
    /// The destination URL, with any redirect wrapper removed.
    pub url: String,
    /// A text snippet summarising the page. May be empty.
    pub snippet: String,
    /// The URL as the engine displays it (breadcrumb), or `url` when absent.
    pub display_url: String,
    /// Which search engine returned this result.
    pub engine: String,
}

impl SearchResult {
    /// Whether this result passes the quality bar applied before results
    /// are returned: a title longer than five characters and an HTTP(S) URL.
    pub fn is_quality(&self) -> bool {
        self.title.chars().count() > 5 && self.url.starts_with("http")
    }
}

/// Search engines serpkeep knows how to scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchEngine {
    /// Google: primary engine, two extraction strategies.
    Google,
    /// Bing: fallback engine, single extraction strategy.
    Bing,
}

impl SearchEngine {
    /// Returns the human-readable name of this engine.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::Bing => "Bing",
        }
    }

    /// Returns all available engine variants, primary first.
    pub fn all() -> &'static [SearchEngine] {
        &[Self::Google, Self::Bing]
    }
}

impl fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(title: &str, url: &str) -> SearchResult {
        SearchResult {
            title: title.into(),
            url: url.into(),
            snippet: String::new(),
            display_url: url.into(),
            engine: "Google".into(),
        }
    }

    #[test]
    fn quality_requires_title_longer_than_five_chars() {
        assert!(!result("Rusty", "https://a.com").is_quality());
        assert!(result("Rust 1", "https://a.com").is_quality());
    }

    #[test]
    fn quality_counts_chars_not_bytes() {
        // Five characters, ten bytes.
        assert!(!result("ééééé", "https://a.com").is_quality());
    }

    #[test]
    fn quality_requires_http_scheme() {
        assert!(!result("Rust Programming", "/url?q=x").is_quality());
        assert!(!result("Rust Programming", "ftp://a.com").is_quality());
        assert!(result("Rust Programming", "http://a.com").is_quality());
    }

    #[test]
    fn search_result_json_shape() {
        let json = serde_json::to_value(result("Example", "https://example.com")).expect("serialize");
        assert_eq!(json["title"], "Example");
        assert_eq!(json["display_url"], "https://example.com");
        assert_eq!(json["engine"], "Google");
    }

    #[test]
    fn search_engine_display() {
        assert_eq!(SearchEngine::Google.to_string(), "Google");
        assert_eq!(SearchEngine::Bing.to_string(), "Bing");
    }

    #[test]
    fn search_engine_all_lists_primary_first() {
        assert_eq!(SearchEngine::all(), &[SearchEngine::Google, SearchEngine::Bing]);
    }
}
