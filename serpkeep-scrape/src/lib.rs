//! # serpkeep-scrape
//!
//! Best-effort scraping of public search engine results pages.
//!
//! No API keys are involved: results pages are fetched with browser-like
//! headers and walked with CSS selectors.
//!
//! ## Design
//!
//! - Google is the primary engine, with a container pass and an alternative
//!   link-scanning pass when containers yield nothing
//! - Bing is consulted once, only when Google returns nothing
//! - Requests are sequential and preceded by a random politeness delay
//! - A quality filter drops short titles and non-HTTP URLs
//! - Failures never escape: the worst case is an empty result set
//!
//! ## Security
//!
//! - No network listeners; this is a library
//! - Search queries are logged only at trace level

pub mod config;
pub mod engine;
pub mod engines;
pub mod error;
mod extract;
pub mod http;
pub mod orchestrator;
pub mod types;
pub mod url_clean;

use std::sync::Arc;

pub use config::ScrapeConfig;
pub use engine::Engine;
pub use error::{ExtractError, FetchError, Result, ScrapeError};
pub use http::{Fetcher, HeaderMap, HeaderRotation, HttpFetcher};
pub use orchestrator::Orchestrator;
pub use types::{SearchEngine, SearchResult};

/// Search for `query` over the network, returning at most `max_results`
/// quality results.
///
/// Builds an [`Orchestrator`] on an [`HttpFetcher`]. Long-lived callers
/// should build the orchestrator once and reuse it.
///
/// # Errors
///
/// Returns [`ScrapeError::Config`] if `config` is invalid, or
/// [`ScrapeError::Client`] if the HTTP client cannot be built. Engine
/// failures are not errors.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> serpkeep_scrape::Result<()> {
/// let config = serpkeep_scrape::ScrapeConfig::default();
/// let results = serpkeep_scrape::search("rust programming", 15, &config).await?;
/// for result in &results {
///     println!("{}: {}", result.title, result.url);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(
    query: &str,
    max_results: usize,
    config: &ScrapeConfig,
) -> Result<Vec<SearchResult>> {
    config.validate()?;
    let fetcher = Arc::new(HttpFetcher::new()?);
    let orchestrator = Orchestrator::new(config.clone(), fetcher)?;
    Ok(orchestrator.search(query, max_results).await)
}
