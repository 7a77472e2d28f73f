//! Search history: one [`SearchRecord`] per saved artifact.
//!
//! Records are created once, never mutated, and deleted together with
//! their artifact. Backed by SQLite in [`sqlite::RecordStore`].

mod schema;
pub mod sqlite;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use sqlite::RecordStore;

/// Longest query a record will hold, in characters.
pub const MAX_QUERY_CHARS: usize = 200;

/// Metadata for one saved search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRecord {
    pub id: i64,
    pub query: String,
    pub timestamp: DateTime<Utc>,
    /// Artifact basename, as shown to users and used in routes.
    pub artifact_key: String,
    pub result_count: u32,
}

/// History database failures.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("lock poisoned: {0}")]
    Lock(String),
}
