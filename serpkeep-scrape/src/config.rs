//! Scrape configuration with sensible defaults.
//!
//! [`ScrapeConfig`] controls fallback behaviour, politeness delays,
//! per-engine timeouts, the User-Agent rotation pool, and the engine
//! endpoints. The defaults are tuned for polite, best-effort scraping.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ScrapeError;
use crate::types::SearchEngine;

/// Realistic browser User-Agent strings, rotated per request.
const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Configuration for the scrape pipeline.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Query the secondary engine when the primary returns nothing.
    pub fallback_enabled: bool,
    /// Random delay range in milliseconds `(min, max)` slept before the
    /// primary request.
    pub primary_delay_ms: (u64, u64),
    /// Random delay range in milliseconds `(min, max)` slept before the
    /// fallback request.
    pub fallback_delay_ms: (u64, u64),
    /// Google request timeout in seconds.
    pub google_timeout_seconds: u64,
    /// Bing request timeout in seconds.
    pub bing_timeout_seconds: u64,
    /// User-Agent pool. One entry is picked at random per request.
    pub user_agents: Vec<String>,
    /// Origin used for Google requests and for absolutising site-relative links.
    pub google_base_url: String,
    /// Origin used for Bing requests.
    pub bing_base_url: String,
    /// Interface language passed to Google (`hl`).
    pub language: String,
    /// Country passed to Google (`gl`).
    pub country: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            fallback_enabled: true,
            primary_delay_ms: (1000, 3000),
            fallback_delay_ms: (1000, 2000),
            google_timeout_seconds: 15,
            bing_timeout_seconds: 10,
            user_agents: DEFAULT_USER_AGENTS.iter().map(|ua| (*ua).to_owned()).collect(),
            google_base_url: "https://www.google.com".into(),
            bing_base_url: "https://www.bing.com".into(),
            language: "en".into(),
            country: "us".into(),
        }
    }
}

impl ScrapeConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - both timeouts must be greater than 0
    /// - each delay range must have `min <= max`
    /// - the User-Agent pool must not be empty
    /// - both base URLs must parse
    pub fn validate(&self) -> Result<(), ScrapeError> {
        if self.google_timeout_seconds == 0 || self.bing_timeout_seconds == 0 {
            return Err(ScrapeError::Config(
                "engine timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.primary_delay_ms.0 > self.primary_delay_ms.1 {
            return Err(ScrapeError::Config(
                "primary_delay_ms min must be <= max".into(),
            ));
        }
        if self.fallback_delay_ms.0 > self.fallback_delay_ms.1 {
            return Err(ScrapeError::Config(
                "fallback_delay_ms min must be <= max".into(),
            ));
        }
        if self.user_agents.iter().all(|ua| ua.trim().is_empty()) {
            return Err(ScrapeError::Config(
                "at least one user agent must be configured".into(),
            ));
        }
        for (name, base) in [
            ("google_base_url", &self.google_base_url),
            ("bing_base_url", &self.bing_base_url),
        ] {
            Url::parse(base)
                .map_err(|e| ScrapeError::Config(format!("{name} is not a valid URL: {e}")))?;
        }
        Ok(())
    }

    /// Timeout for requests to `engine`, in seconds.
    pub fn timeout_seconds(&self, engine: SearchEngine) -> u64 {
        match engine {
            SearchEngine::Google => self.google_timeout_seconds,
            SearchEngine::Bing => self.bing_timeout_seconds,
        }
    }

    /// Label describing which engines a search may consult, as written
    /// into result artifacts.
    pub fn engine_label(&self) -> String {
        if self.fallback_enabled {
            format!(
                "{} (with {} fallback)",
                SearchEngine::Google,
                SearchEngine::Bing
            )
        } else {
            SearchEngine::Google.to_string()
        }
    }

    /// A configuration with no politeness delays, for tests and tools.
    pub fn without_delays(mut self) -> Self {
        self.primary_delay_ms = (0, 0);
        self.fallback_delay_ms = (0, 0);
        self
    }
}
