//! Fallback orchestrator: primary engine, one fallback attempt, quality filter.
//!
//! Requests are sequential. A politeness delay precedes the primary
//! request and a shorter one precedes the fallback. Fetch failures are
//! logged and count as "no results from this engine"; the orchestrator
//! itself never fails.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use url::Url;

use crate::config::ScrapeConfig;
use crate::engine::Engine;
use crate::engines::{BingEngine, GoogleEngine};
use crate::error::ScrapeError;
use crate::http::{Fetcher, HeaderRotation};
use crate::types::SearchResult;

use super::filter::quality_filter;

/// Runs a search against the primary engine with a single fallback.
pub struct Orchestrator {
    fetcher: Arc<dyn Fetcher>,
    headers: HeaderRotation,
    primary: Box<dyn Engine>,
    secondary: Box<dyn Engine>,
    config: ScrapeConfig,
}

impl Orchestrator {
    /// Build an orchestrator using Google as primary and Bing as fallback.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Config`] if `config` fails validation.
    pub fn new(config: ScrapeConfig, fetcher: Arc<dyn Fetcher>) -> Result<Self, ScrapeError> {
        config.validate()?;
        let headers = HeaderRotation::new(&config.user_agents)?;
        Self::with_headers(config, fetcher, headers)
    }

    /// Like [`Orchestrator::new`] with an explicit header rotation, so
    /// callers can seed the User-Agent choice.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Config`] if `config` fails validation.
    pub fn with_headers(
        config: ScrapeConfig,
        fetcher: Arc<dyn Fetcher>,
        headers: HeaderRotation,
    ) -> Result<Self, ScrapeError> {
        config.validate()?;
        let google_base = parse_base(&config.google_base_url)?;
        let bing_base = parse_base(&config.bing_base_url)?;
        let primary = GoogleEngine::new(google_base, &config.language, &config.country);
        let secondary = BingEngine::new(bing_base);
        Ok(Self {
            fetcher,
            headers,
            primary: Box::new(primary),
            secondary: Box::new(secondary),
            config,
        })
    }

    /// The configuration this orchestrator runs with.
    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Search for `query`, returning at most `max_results` quality results.
    ///
    /// # Pipeline
    ///
    /// 1. Sleep a random politeness delay from `primary_delay_ms`
    /// 2. Fetch and extract from the primary engine
    /// 3. If nothing came back and fallback is enabled, sleep a random delay
    ///    from `fallback_delay_ms` and try the secondary engine
    /// 4. Apply the quality filter
    ///
    /// An empty vector is the worst case; no error is ever returned.
    pub async fn search(&self, query: &str, max_results: usize) -> Vec<SearchResult> {
        tracing::trace!(query, max_results, "orchestrating search");

        politeness_delay(self.config.primary_delay_ms).await;
        let mut results = self.query_engine(self.primary.as_ref(), query, max_results).await;

        if results.is_empty() && self.config.fallback_enabled {
            tracing::info!(
                primary = %self.primary.engine_type(),
                fallback = %self.secondary.engine_type(),
                "primary engine returned nothing, trying fallback"
            );
            politeness_delay(self.config.fallback_delay_ms).await;
            results = self
                .query_engine(self.secondary.as_ref(), query, max_results)
                .await;
        }

        quality_filter(results)
    }

    /// Fetch and extract from one engine, absorbing fetch failures.
    async fn query_engine(
        &self,
        engine: &dyn Engine,
        query: &str,
        max_results: usize,
    ) -> Vec<SearchResult> {
        let name = engine.engine_type();
        let url = engine.search_url(query, max_results);
        let timeout = Duration::from_secs(self.config.timeout_seconds(name));
        let headers = self.headers.next_headers();

        match self.fetcher.fetch(&url, &headers, timeout).await {
            Ok(markup) => {
                let results = engine.extract(&markup, max_results);
                tracing::debug!(engine = %name, count = results.len(), "engine returned results");
                results
            }
            Err(err) => {
                tracing::warn!(engine = %name, error = %err, "engine query failed");
                Vec::new()
            }
        }
    }
}

fn parse_base(raw: &str) -> Result<Url, ScrapeError> {
    Url::parse(raw).map_err(|e| ScrapeError::Config(format!("invalid engine URL {raw:?}: {e}")))
}

/// Sleep for a random number of milliseconds in `[min, max]`.
async fn politeness_delay((min, max): (u64, u64)) {
    if max == 0 {
        return;
    }
    let millis = rand::thread_rng().gen_range(min..=max);
    tokio::time::sleep(Duration::from_millis(millis)).await;
}
