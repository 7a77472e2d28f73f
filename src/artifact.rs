//! Plain-text result artifacts.
//!
//! A document has a fixed header block followed by one numbered block per
//! result. Lines are joined with `\n` and there is no trailing newline.
//!
//! ```text
//! Search Query: rust programming
//! Search Date: 2026-10-19 14:03:22
//! Number of Results: 2
//! Search Engine: Google (with Bing fallback)
//! ======================================================================
//!
//! Result 1:
//! Title: ...
//! URL: ...
//! Display URL: ...
//! Snippet: ...
//! --------------------------------------------------
//!
//! ```

use bytes::Bytes;
use chrono::{Local, NaiveDateTime};
use serpkeep_scrape::SearchResult;

use crate::storage::{ArtifactStore, StorageError};
use crate::text::truncate_chars;

/// Width of the rule closing the header block.
const HEADER_RULE_WIDTH: usize = 70;

/// Width of the rule closing each result block.
const RESULT_RULE_WIDTH: usize = 50;

/// Snippets longer than this are cut and suffixed with `...`.
const MAX_SNIPPET_CHARS: usize = 500;

/// The query portion of an artifact name is cut to this length.
const MAX_NAME_QUERY_CHARS: usize = 50;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Artifact could not be persisted.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// The store failed or is unreachable.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The store rejected our credentials.
    #[error("permission denied: {0}")]
    PermissionDenied(String),
}

impl From<StorageError> for WriteError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::PermissionDenied(msg) => Self::PermissionDenied(msg),
            other => Self::StorageUnavailable(other.to_string()),
        }
    }
}

/// Render the artifact document for `results`.
pub fn render_document(
    query: &str,
    results: &[SearchResult],
    engine_label: &str,
    searched_at: NaiveDateTime,
) -> String {
    let mut lines = vec![
        format!("Search Query: {query}"),
        format!("Search Date: {}", searched_at.format(DATE_FORMAT)),
        format!("Number of Results: {}", results.len()),
        format!("Search Engine: {engine_label}"),
        "=".repeat(HEADER_RULE_WIDTH),
        String::new(),
    ];

    for (i, result) in results.iter().enumerate() {
        lines.push(format!("Result {}:", i + 1));
        lines.push(format!("Title: {}", result.title));
        lines.push(format!("URL: {}", result.url));
        lines.push(format!("Display URL: {}", result.display_url));
        lines.push(format!("Snippet: {}", stored_snippet(&result.snippet)));
        lines.push("-".repeat(RESULT_RULE_WIDTH));
        lines.push(String::new());
    }

    lines.join("\n")
}

fn stored_snippet(snippet: &str) -> String {
    let kept = truncate_chars(snippet, MAX_SNIPPET_CHARS);
    if kept.len() < snippet.len() {
        format!("{kept}...")
    } else {
        kept.to_string()
    }
}

/// Storage key for a search run at `searched_at`:
/// `<prefix>/search_<YYYYMMDD_HHMMSS>_<name>.txt`.
///
/// The name is the query with spaces turned into `_`, cut to 50 chars.
/// Characters that are not ASCII alphanumerics, `-` or `_` also become `_`
/// so the basename survives URLs and object-store key encoding.
pub fn artifact_key(prefix: &str, query: &str, searched_at: NaiveDateTime) -> String {
    let name: String = query
        .chars()
        .take(MAX_NAME_QUERY_CHARS)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "{prefix}/search_{}_{name}.txt",
        searched_at.format("%Y%m%d_%H%M%S")
    )
}

/// Final path segment of a key.
pub fn basename(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// The header block of an artifact, read back from its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactHeader {
    pub query: String,
    pub searched_at: NaiveDateTime,
    pub result_count: usize,
    pub engine: String,
}

/// Parse the header block of an artifact document.
///
/// Returns `None` if any of the four header lines is missing or malformed.
pub fn parse_header(text: &str) -> Option<ArtifactHeader> {
    let mut lines = text.lines();
    let query = lines.next()?.strip_prefix("Search Query: ")?.to_string();
    let date = lines.next()?.strip_prefix("Search Date: ")?;
    let searched_at = NaiveDateTime::parse_from_str(date, DATE_FORMAT).ok()?;
    let result_count = lines
        .next()?
        .strip_prefix("Number of Results: ")?
        .parse()
        .ok()?;
    let engine = lines.next()?.strip_prefix("Search Engine: ")?.to_string();
    Some(ArtifactHeader {
        query,
        searched_at,
        result_count,
        engine,
    })
}

/// Writes artifacts into an [`ArtifactStore`].
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    store: ArtifactStore,
    engine_label: String,
}

impl ArtifactWriter {
    pub fn new(store: ArtifactStore, engine_label: impl Into<String>) -> Self {
        Self {
            store,
            engine_label: engine_label.into(),
        }
    }

    /// Render and store the artifact for `results`, returning its basename.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError`] if the store rejects the write.
    pub async fn write(&self, query: &str, results: &[SearchResult]) -> Result<String, WriteError> {
        self.write_at(query, results, Local::now().naive_local()).await
    }

    /// [`ArtifactWriter::write`] with an explicit timestamp.
    pub async fn write_at(
        &self,
        query: &str,
        results: &[SearchResult],
        searched_at: NaiveDateTime,
    ) -> Result<String, WriteError> {
        let key = artifact_key(self.store.prefix(), query, searched_at);
        let document = render_document(query, results, &self.engine_label, searched_at);

        let written = self
            .store
            .put_new(&key, Bytes::from(document))
            .await
            .inspect_err(|e| tracing::error!(key = %key, error = %e, "artifact write failed"))?;

        tracing::info!(key = %written, results = results.len(), "artifact saved");
        Ok(basename(&written).to_string())
    }
}
