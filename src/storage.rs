//! Artifact storage over `object_store`.
//!
//! One adapter drives an S3-compatible bucket (with presigned download
//! URLs), a local directory, or an in-memory store for tests. Keys are
//! never overwritten: [`ArtifactStore::put_new`] writes with
//! [`PutMode::Create`] and suffixes the name when the key is taken.

use std::sync::Arc;
use std::time::Duration;

use axum::http::Method;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::signer::Signer;
use object_store::{ObjectStore, PutMode, PutOptions, PutPayload};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;

use crate::config::{StorageBackend, StorageConfig};

/// Listings return at most this many artifacts.
pub const MAX_LISTED: usize = 100;

/// Attempts at a free key before giving up.
const MAX_PUT_ATTEMPTS: usize = 5;

/// Length of the random suffix appended on key collisions.
const SUFFIX_LEN: usize = 7;

/// Object storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No object under that key.
    #[error("artifact not found: {0}")]
    NotFound(String),

    /// The artifact name is unusable as a key component.
    #[error("invalid artifact name: {0}")]
    InvalidName(String),

    /// The store is unreachable, misconfigured or failed the request.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Credentials were rejected.
    #[error("storage permission denied: {0}")]
    PermissionDenied(String),
}

impl From<object_store::Error> for StorageError {
    fn from(err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { path, .. } => Self::NotFound(path),
            object_store::Error::PermissionDenied { .. }
            | object_store::Error::Unauthenticated { .. } => {
                Self::PermissionDenied(err.to_string())
            }
            other => Self::Unavailable(other.to_string()),
        }
    }
}

/// One entry of a storage listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredArtifact {
    /// Full object key, prefix included.
    pub key: String,
    /// Last key segment; what users see and what routes take.
    pub filename: String,
    /// When the object was last written.
    pub last_modified: DateTime<Utc>,
    /// Size in bytes.
    pub size: u64,
}

/// Artifact store rooted at a key prefix.
///
/// Cheap to clone; clones share the underlying store.
#[derive(Clone)]
pub struct ArtifactStore {
    store: Arc<dyn ObjectStore>,
    signer: Option<Arc<dyn Signer>>,
    prefix: String,
    presign_ttl: Duration,
}

impl std::fmt::Debug for ArtifactStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactStore")
            .field("store", &self.store.to_string())
            .field("signed", &self.signer.is_some())
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl ArtifactStore {
    /// Wrap an existing store. Downloads are streamed since there is no signer.
    pub fn new(store: Arc<dyn ObjectStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            signer: None,
            prefix: prefix.into().trim_matches('/').to_string(),
            presign_ttl: Duration::from_secs(3600),
        }
    }

    /// In-memory store, for tests and dry runs.
    pub fn in_memory(prefix: impl Into<String>) -> Self {
        Self::new(Arc::new(InMemory::new()), prefix)
    }

    /// Open the backend named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] if the local root cannot be
    /// created or the S3 client cannot be configured.
    pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        let ttl = Duration::from_secs(config.presign_ttl_seconds);
        match config.backend {
            StorageBackend::Local => {
                std::fs::create_dir_all(&config.root).map_err(|e| {
                    StorageError::Unavailable(format!(
                        "cannot create {}: {e}",
                        config.root.display()
                    ))
                })?;
                let local = LocalFileSystem::new_with_prefix(&config.root)?;
                tracing::info!(root = %config.root.display(), "using local artifact storage");
                Ok(Self::new(Arc::new(local), config.prefix.clone()).with_presign_ttl(ttl))
            }
            StorageBackend::S3 => {
                let mut builder = AmazonS3Builder::from_env()
                    .with_bucket_name(&config.bucket)
                    .with_region(&config.region);
                if let Some(endpoint) = &config.endpoint {
                    builder = builder
                        .with_endpoint(endpoint)
                        .with_allow_http(endpoint.starts_with("http://"));
                }
                let s3 = Arc::new(builder.build()?);
                tracing::info!(bucket = %config.bucket, "using S3 artifact storage");
                Ok(Self {
                    store: s3.clone(),
                    signer: Some(s3),
                    prefix: config.prefix.trim_matches('/').to_string(),
                    presign_ttl: ttl,
                })
            }
        }
    }

    /// Override the presigned URL lifetime.
    pub fn with_presign_ttl(mut self, ttl: Duration) -> Self {
        self.presign_ttl = ttl;
        self
    }

    /// The key prefix artifacts live under.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Full key for an artifact basename.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidName`] for empty names and names that
    /// could escape the prefix (`/`, `\`, `..`).
    pub fn key_for(&self, filename: &str) -> Result<String, StorageError> {
        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains("..")
        {
            return Err(StorageError::InvalidName(filename.to_string()));
        }
        Ok(format!("{}/{filename}", self.prefix))
    }

    /// Write `bytes` under `key` without overwriting anything.
    ///
    /// When `key` is taken, `_` and seven random alphanumerics are inserted
    /// before the extension and the write is retried. Returns the key
    /// actually written.
    pub async fn put_new(&self, key: &str, bytes: Bytes) -> Result<String, StorageError> {
        let mut candidate = key.to_string();
        for _ in 0..MAX_PUT_ATTEMPTS {
            let path = ObjectPath::from(candidate.as_str());
            let payload = PutPayload::from(bytes.clone());
            match self
                .store
                .put_opts(&path, payload, PutOptions::from(PutMode::Create))
                .await
            {
                Ok(_) => return Ok(candidate),
                Err(object_store::Error::AlreadyExists { .. }) => {
                    tracing::debug!(key = %candidate, "artifact key taken, suffixing");
                    candidate = with_random_suffix(key);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(StorageError::Unavailable(format!(
            "no free key for {key} after {MAX_PUT_ATTEMPTS} attempts"
        )))
    }

    /// Artifacts under the prefix, newest first, at most [`MAX_LISTED`].
    ///
    /// Backends list in key order, not by age, so every entry is visited.
    /// At most `2 * MAX_LISTED` are held at once.
    pub async fn list(&self) -> Result<Vec<StoredArtifact>, StorageError> {
        let prefix = ObjectPath::from(self.prefix.as_str());
        let mut artifacts = self
            .store
            .list(Some(&prefix))
            .map_err(StorageError::from)
            .try_fold(Vec::with_capacity(MAX_LISTED), |mut kept, meta| async move {
                kept.push(StoredArtifact {
                    filename: meta.location.filename().unwrap_or_default().to_string(),
                    key: meta.location.to_string(),
                    last_modified: meta.last_modified,
                    size: meta.size,
                });
                if kept.len() >= 2 * MAX_LISTED {
                    newest_first(&mut kept);
                }
                Ok(kept)
            })
            .await?;
        newest_first(&mut artifacts);
        Ok(artifacts)
    }

    /// Read an artifact's bytes.
    pub async fn get(&self, key: &str) -> Result<Bytes, StorageError> {
        let result = self.store.get(&ObjectPath::from(key)).await?;
        Ok(result.bytes().await?)
    }

    /// Delete an artifact. Missing keys are reported as [`StorageError::NotFound`].
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = ObjectPath::from(key);
        // Some backends treat deleting a missing key as success.
        self.store.head(&path).await?;
        self.store.delete(&path).await?;
        Ok(())
    }

    /// Time-limited download URL, or `None` when the backend cannot sign.
    pub async fn presigned_url(&self, key: &str) -> Result<Option<String>, StorageError> {
        let Some(signer) = &self.signer else {
            return Ok(None);
        };
        let url = signer
            .signed_url(Method::GET, &ObjectPath::from(key), self.presign_ttl)
            .await?;
        Ok(Some(url.to_string()))
    }
}

fn newest_first(artifacts: &mut Vec<StoredArtifact>) {
    artifacts.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
    artifacts.truncate(MAX_LISTED);
}

/// `dir/name.txt` → `dir/name_AbC1234.txt`.
fn with_random_suffix(key: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect();
    let name_start = key.rfind('/').map_or(0, |i| i + 1);
    match key[name_start..].rfind('.') {
        Some(dot) if dot > 0 => {
            let split = name_start + dot;
            format!("{}_{suffix}{}", &key[..split], &key[split..])
        }
        _ => format!("{key}_{suffix}"),
    }
}
