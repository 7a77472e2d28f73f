//! Search service: scrape, save the artifact, record the search.
//!
//! Everything the web layer and the CLI do goes through [`SearchService`].
//! Soft failures (nothing found, artifact not saved, history not recorded)
//! come back as [`Banner`]s on a successful [`SearchOutcome`]; only
//! invalid input and hard storage errors are [`ServiceError`]s.

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use serpkeep_scrape::{Fetcher, HttpFetcher, Orchestrator, SearchResult};

use crate::artifact::ArtifactWriter;
use crate::config::{AppConfig, SearchSettings};
use crate::error::AppError;
use crate::records::{MAX_QUERY_CHARS, RecordError, RecordStore, SearchRecord};
use crate::storage::{ArtifactStore, StorageError, StoredArtifact};
use crate::text::truncate_chars;

/// Error text shown in banners is cut to this many characters.
const MAX_BANNER_ERROR_CHARS: usize = 100;

/// Recent searches shown on the search page.
pub const RECENT_SEARCHES: usize = 10;

/// Service-level failures.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Suggestion query under the minimum length.
    #[error("Query too short")]
    QueryTooShort,

    /// Empty or oversized search query.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Records(#[from] RecordError),
}

/// Banner severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl BannerLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// A user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub level: BannerLevel,
    pub message: String,
}

impl Banner {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: BannerLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: BannerLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: BannerLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: BannerLevel::Error,
            message: message.into(),
        }
    }
}

/// Everything a results page needs.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub query: String,
    pub results: Vec<SearchResult>,
    /// Basename of the saved artifact, if saving succeeded.
    pub artifact: Option<String>,
    /// History entry, if recording succeeded.
    pub record: Option<SearchRecord>,
    pub banners: Vec<Banner>,
}

/// Search history plus the raw storage listing.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryView {
    pub records: Vec<SearchRecord>,
    pub files: Vec<StoredArtifact>,
}

/// How to hand an artifact to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Download {
    /// Send the user to a presigned URL.
    Redirect(String),
    /// Stream these bytes as an attachment.
    Content { filename: String, bytes: Bytes },
}

/// The application's operations over scrape, storage and history.
pub struct SearchService {
    orchestrator: Orchestrator,
    writer: ArtifactWriter,
    store: ArtifactStore,
    records: Arc<RecordStore>,
    settings: SearchSettings,
}

impl SearchService {
    pub fn new(
        orchestrator: Orchestrator,
        store: ArtifactStore,
        records: Arc<RecordStore>,
        settings: SearchSettings,
    ) -> Self {
        let writer = ArtifactWriter::new(store.clone(), settings.scrape.engine_label());
        Self {
            orchestrator,
            writer,
            store,
            records,
            settings,
        }
    }

    /// Build the whole service from configuration, with a real HTTP fetcher.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or storage or the
    /// history database cannot be opened.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new()?);
        Self::from_config_with_fetcher(config, fetcher)
    }

    /// [`SearchService::from_config`] with a caller-supplied fetcher.
    ///
    /// # Errors
    ///
    /// Same as [`SearchService::from_config`].
    pub fn from_config_with_fetcher(
        config: &AppConfig,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<Self, AppError> {
        config.validate()?;
        let orchestrator = Orchestrator::new(config.search.scrape.clone(), fetcher)?;
        let store = ArtifactStore::from_config(&config.storage)?;
        let records = Arc::new(RecordStore::open(&config.database.path)?);
        Ok(Self::new(orchestrator, store, records, config.search.clone()))
    }

    /// Run a form search: scrape, save the artifact, record the search.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidQuery`] for empty or oversized
    /// queries. Scrape, write and record failures are banners, not errors.
    pub async fn run_search(&self, query: &str) -> Result<SearchOutcome, ServiceError> {
        let query = validate_query(query)?;
        tracing::debug!(query = %query, "running search");

        let mut banners = vec![Banner::info(format!(
            "Searching for '{query}'... This may take a few seconds."
        ))];

        let results = self
            .orchestrator
            .search(&query, self.settings.max_results)
            .await;

        if results.is_empty() {
            banners.push(Banner::warning(
                "No results found for your query. Try rephrasing your search terms or using different keywords.",
            ));
            return Ok(SearchOutcome {
                query,
                results,
                artifact: None,
                record: None,
                banners,
            });
        }

        let artifact = match self.writer.write(&query, &results).await {
            Ok(name) => name,
            Err(err) => {
                tracing::error!(error = %err, "search results not saved");
                banners.push(Banner::error(
                    "Search completed but failed to save results to storage.",
                ));
                return Ok(SearchOutcome {
                    query,
                    results,
                    artifact: None,
                    record: None,
                    banners,
                });
            }
        };

        let count = u32::try_from(results.len()).unwrap_or(u32::MAX);
        let record = match self.records.create(&query, &artifact, count) {
            Ok(record) => {
                banners.push(Banner::success(format!(
                    "Search completed! Found {} high-quality results. Results saved to storage.",
                    results.len()
                )));
                Some(record)
            }
            Err(err) => {
                // The artifact stays behind without a history row.
                tracing::error!(artifact = %artifact, error = %err, "search not recorded");
                banners.push(Banner::error(format!(
                    "Search results were saved but the history entry could not be recorded. Error: {}",
                    truncate_chars(&err.to_string(), MAX_BANNER_ERROR_CHARS)
                )));
                None
            }
        };

        Ok(SearchOutcome {
            query,
            results,
            artifact: Some(artifact),
            record,
            banners,
        })
    }

    /// Live suggestions: the scrape pipeline with a smaller cap, nothing saved.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::QueryTooShort`] without fetching anything when
    /// the trimmed query is under the minimum length.
    pub async fn suggest(&self, query: &str) -> Result<Vec<SearchResult>, ServiceError> {
        let query = query.trim();
        if query.chars().count() < self.settings.suggest_min_chars {
            return Err(ServiceError::QueryTooShort);
        }
        let cap = self.settings.suggest_max_results;
        let mut results = self.orchestrator.search(query, cap).await;
        results.truncate(cap);
        Ok(results)
    }

    /// The most recent searches, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<SearchRecord>, ServiceError> {
        Ok(self.records.recent(limit)?)
    }

    /// All recorded searches plus the storage listing.
    ///
    /// A failed listing is logged and shown as empty.
    pub async fn history(&self) -> Result<HistoryView, ServiceError> {
        let records = self.records.all()?;
        let files = match self.store.list().await {
            Ok(files) => files,
            Err(err) => {
                tracing::warn!(error = %err, "artifact listing failed");
                Vec::new()
            }
        };
        Ok(HistoryView { records, files })
    }

    /// Delete an artifact and every history entry that points at it.
    ///
    /// Returns how many history entries were removed.
    ///
    /// # Errors
    ///
    /// [`StorageError::InvalidName`] for names with path separators or `..`,
    /// [`StorageError::NotFound`] when neither the artifact nor any history
    /// entry for it exists.
    pub async fn delete(&self, filename: &str) -> Result<usize, ServiceError> {
        let key = self.store.key_for(filename)?;
        let object_removed = match self.store.delete(&key).await {
            Ok(()) => true,
            // Already gone: still clear any records pointing at it.
            Err(StorageError::NotFound(_)) => false,
            Err(err) => return Err(err.into()),
        };
        let removed = self.records.delete_by_artifact_key(filename)?;
        if !object_removed && removed == 0 {
            return Err(StorageError::NotFound(key).into());
        }
        tracing::info!(filename, object_removed, removed, "artifact deleted");
        Ok(removed)
    }

    /// Resolve a download: a presigned redirect when the backend signs,
    /// otherwise the artifact's bytes.
    ///
    /// # Errors
    ///
    /// [`StorageError::InvalidName`] for bad names, [`StorageError::NotFound`]
    /// for missing artifacts.
    pub async fn download(&self, filename: &str) -> Result<Download, ServiceError> {
        let key = self.store.key_for(filename)?;
        if let Some(url) = self.store.presigned_url(&key).await? {
            return Ok(Download::Redirect(url));
        }
        let bytes = self.store.get(&key).await?;
        Ok(Download::Content {
            filename: filename.to_string(),
            bytes,
        })
    }

    /// Result caps and scrape settings in effect.
    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }
}

fn validate_query(raw: &str) -> Result<String, ServiceError> {
    let query = raw.trim();
    if query.is_empty() {
        return Err(ServiceError::InvalidQuery("query must not be empty".into()));
    }
    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(ServiceError::InvalidQuery(format!(
            "query must be at most {MAX_QUERY_CHARS} characters"
        )));
    }
    Ok(query.to_string())
}
