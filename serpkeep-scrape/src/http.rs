//! HTTP fetching with header rotation for search engine requests.
//!
//! [`HeaderRotation`] picks a browser-like header set per request from an
//! immutable User-Agent pool. [`HttpFetcher`] issues the GET with a shared
//! [`reqwest::Client`] and maps failures onto [`FetchError`]. Retries are
//! the orchestrator's business, not this module's.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use reqwest::header::{self, HeaderValue};

pub use reqwest::header::HeaderMap;

use crate::error::{FetchError, ScrapeError};

/// Fixed browser-like headers sent alongside the rotated User-Agent.
///
/// `Accept-Encoding` is left to the client so responses are always in an
/// encoding it can decompress.
const BROWSER_HEADERS: &[(&str, &str)] = &[
    (
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
    ),
    ("accept-language", "en-US,en;q=0.5"),
    ("dnt", "1"),
    ("connection", "keep-alive"),
    ("upgrade-insecure-requests", "1"),
];

/// Retrieves raw results pages.
///
/// Object safe so callers can swap the network for a canned fetcher in tests.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url` with `headers`, giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// [`FetchError::Timeout`] when the deadline passes,
    /// [`FetchError::HttpStatus`] for non-2xx responses, and
    /// [`FetchError::Network`] for everything else.
    async fn fetch(
        &self,
        url: &str,
        headers: &HeaderMap,
        timeout: Duration,
    ) -> Result<Vec<u8>, FetchError>;
}

/// Randomised request headers drawn from an immutable User-Agent pool.
pub struct HeaderRotation {
    user_agents: Vec<HeaderValue>,
    rng: Mutex<StdRng>,
}

impl HeaderRotation {
    /// Build a rotation seeded from OS entropy.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Config`] if the pool is empty or an entry is
    /// not a valid header value.
    pub fn new(user_agents: &[String]) -> Result<Self, ScrapeError> {
        Self::with_rng(user_agents, StdRng::from_entropy())
    }

    /// Build a rotation with an explicit randomness source.
    ///
    /// # Errors
    ///
    /// Same as [`HeaderRotation::new`].
    pub fn with_rng(user_agents: &[String], rng: StdRng) -> Result<Self, ScrapeError> {
        let user_agents = user_agents
            .iter()
            .map(|ua| ua.trim())
            .filter(|ua| !ua.is_empty())
            .map(|ua| {
                HeaderValue::from_str(ua)
                    .map_err(|e| ScrapeError::Config(format!("invalid user agent {ua:?}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if user_agents.is_empty() {
            return Err(ScrapeError::Config(
                "at least one user agent must be configured".into(),
            ));
        }
        Ok(Self {
            user_agents,
            rng: Mutex::new(rng),
        })
    }

    /// Headers for the next request: a random User-Agent plus the fixed
    /// browser set.
    pub fn next_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(BROWSER_HEADERS.len() + 1);
        headers.insert(header::USER_AGENT, self.pick_user_agent());
        for &(name, value) in BROWSER_HEADERS {
            headers.insert(name, HeaderValue::from_static(value));
        }
        headers
    }

    fn pick_user_agent(&self) -> HeaderValue {
        // A poisoned lock only means another thread panicked mid-choice;
        // the generator state is still usable.
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        self.user_agents
            .choose(&mut *rng)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(""))
    }
}

/// [`Fetcher`] backed by a shared [`reqwest::Client`].
///
/// The client has a cookie store (for consent pages), brotli and gzip
/// decompression, and a bounded redirect policy. Timeouts are applied
/// per request.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build the fetcher.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Client`] if the client cannot be constructed.
    pub fn new() -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| ScrapeError::Client(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &str,
        headers: &HeaderMap,
        timeout: Duration,
    ) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .headers(headers.clone())
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        tracing::trace!(bytes = body.len(), "results page received");
        Ok(body.to_vec())
    }
}
