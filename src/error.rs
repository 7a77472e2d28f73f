//! Error types for the serpkeep application.
//!
//! Each layer has its own enum next to the code that raises it
//! ([`crate::artifact::WriteError`], [`crate::storage::StorageError`],
//! [`crate::records::RecordError`], [`crate::service::ServiceError`]).
//! [`AppError`] is what startup and the binary see.

use crate::records::RecordError;
use crate::storage::StorageError;

/// Top-level error type for startup, configuration and serving.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The scrape pipeline could not be built.
    #[error("scrape error: {0}")]
    Scrape(#[from] serpkeep_scrape::ScrapeError),

    /// Object storage could not be opened.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The history database could not be opened.
    #[error("records error: {0}")]
    Records(#[from] RecordError),

    /// HTTP server failure.
    #[error("server error: {0}")]
    Server(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AppError>;
