//! Error types for the serpkeep-scrape crate.
//!
//! Fetch and extraction errors never leave the orchestrator: they are
//! logged and turned into an empty result set for the affected engine.
//! Only configuration errors surface to callers.

/// Failure to retrieve a search engine results page.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The request did not complete within the engine's timeout.
    #[error("request timed out")]
    Timeout,

    /// The engine answered with a non-2xx status code.
    #[error("unexpected HTTP status {0}")]
    HttpStatus(u16),

    /// Connection, TLS, or body read failure.
    #[error("network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::HttpStatus(status.as_u16())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Failure while walking a results page.
///
/// Internal to the extractors: the public `extract` entry points log it and
/// return an empty sequence.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExtractError {
    /// A CSS selector failed to compile.
    #[error("invalid selector: {0}")]
    Selector(String),
}

/// Errors surfaced by the public scrape API.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// Invalid scrape configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Convenience type alias for serpkeep-scrape results.
pub type Result<T> = std::result::Result<T, ScrapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_timeout() {
        assert_eq!(FetchError::Timeout.to_string(), "request timed out");
    }

    #[test]
    fn display_http_status() {
        let err = FetchError::HttpStatus(429);
        assert_eq!(err.to_string(), "unexpected HTTP status 429");
    }

    #[test]
    fn display_network() {
        let err = FetchError::Network("connection refused".into());
        assert_eq!(err.to_string(), "network error: connection refused");
    }

    #[test]
    fn display_selector() {
        let err = ExtractError::Selector("div..g".into());
        assert_eq!(err.to_string(), "invalid selector: div..g");
    }

    #[test]
    fn display_config() {
        let err = ScrapeError::Config("max_results must be > 0".into());
        assert_eq!(err.to_string(), "config error: max_results must be > 0");
    }

    #[test]
    fn errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FetchError>();
        assert_send_sync::<ExtractError>();
        assert_send_sync::<ScrapeError>();
    }
}
