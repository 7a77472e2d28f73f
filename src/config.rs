//! Application configuration, loaded from TOML.
//!
//! Every section is `#[serde(default)]`, so an empty file (or no file at
//! all) yields a working local setup: artifacts under the user's data
//! directory, history in a SQLite file beside them, server on localhost.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serpkeep_scrape::ScrapeConfig;

use crate::error::{AppError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Result caps and scrape pipeline settings.
    pub search: SearchSettings,
    /// Where artifacts are stored.
    pub storage: StorageConfig,
    /// Where search history is recorded.
    pub database: DatabaseConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port (0 picks a free port).
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
        }
    }
}

/// Result caps plus the scrape pipeline's own settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Results requested for a form search.
    pub max_results: usize,
    /// Results requested for a live suggestion.
    pub suggest_max_results: usize,
    /// Shortest trimmed query the suggestion endpoint will run.
    pub suggest_min_chars: usize,
    /// Engine timeouts, delays, User-Agent pool and base URLs.
    #[serde(flatten)]
    pub scrape: ScrapeConfig,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_results: 15,
            suggest_max_results: 5,
            suggest_min_chars: 3,
            scrape: ScrapeConfig::default(),
        }
    }
}

impl SearchSettings {
    /// Rejects zero result caps and anything [`ScrapeConfig::validate`] rejects.
    pub fn validate(&self) -> Result<()> {
        if self.max_results == 0 {
            return Err(AppError::Config(
                "search.max_results must be greater than 0".into(),
            ));
        }
        if self.suggest_max_results == 0 {
            return Err(AppError::Config(
                "search.suggest_max_results must be greater than 0".into(),
            ));
        }
        self.scrape.validate()?;
        Ok(())
    }
}

/// Storage backend selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// A directory on the local filesystem.
    #[default]
    Local,
    /// An S3-compatible bucket. Credentials come from `AWS_*` variables.
    S3,
}

/// Artifact storage settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Which backend to use.
    pub backend: StorageBackend,
    /// Root directory for the local backend.
    pub root: PathBuf,
    /// Bucket name for the S3 backend.
    pub bucket: String,
    /// Region for the S3 backend.
    pub region: String,
    /// Custom endpoint for S3-compatible services.
    pub endpoint: Option<String>,
    /// Key prefix under which artifacts are written.
    pub prefix: String,
    /// Lifetime of presigned download URLs, in seconds.
    pub presign_ttl_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            root: data_dir().join("artifacts"),
            bucket: String::new(),
            region: "us-east-1".into(),
            endpoint: None,
            prefix: "search_results".into(),
            presign_ttl_seconds: 3600,
        }
    }
}

/// History database settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path of the SQLite file.
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: data_dir().join("serpkeep.db"),
        }
    }
}

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("serpkeep")
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/serpkeep/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("serpkeep").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("serpkeep")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/serpkeep-config/config.toml")
        }
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] (or a wrapped scrape config error) for
    /// the first invalid field found.
    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;
        if self.storage.prefix.trim_matches('/').is_empty() {
            return Err(AppError::Config("storage.prefix must not be empty".into()));
        }
        if self.storage.backend == StorageBackend::S3 && self.storage.bucket.trim().is_empty() {
            return Err(AppError::Config(
                "storage.bucket is required for the s3 backend".into(),
            ));
        }
        if self.storage.presign_ttl_seconds == 0 {
            return Err(AppError::Config(
                "storage.presign_ttl_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.search.max_results, 15);
        assert_eq!(config.search.suggest_max_results, 5);
        assert_eq!(config.search.suggest_min_chars, 3);
        assert_eq!(config.storage.prefix, "search_results");
        assert_eq!(config.storage.presign_ttl_seconds, 3600);
        assert_eq!(config.storage.backend, StorageBackend::Local);
    }

    #[test]
    fn from_file_nonexistent_returns_error() {
        let result = AppConfig::from_file(std::path::Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn from_file_invalid_toml_returns_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").expect("write");
        assert!(AppConfig::from_file(&path).is_err());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.server.port = 9123;
        config.search.scrape.fallback_enabled = false;
        config.storage.backend = StorageBackend::S3;
        config.storage.bucket = "results-bucket".into();
        config.save_to_file(&path).expect("save");

        let loaded = AppConfig::from_file(&path).expect("load");
        assert_eq!(loaded, config);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let toml_str = r#"
[server]
port = 8080

[search]
max_results = 20
google_timeout_seconds = 30

[storage]
backend = "s3"
bucket = "archive"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.search.max_results, 20);
        assert_eq!(config.search.suggest_max_results, 5);
        assert_eq!(config.search.scrape.google_timeout_seconds, 30);
        assert_eq!(config.search.scrape.bing_timeout_seconds, 10);
        assert_eq!(config.storage.backend, StorageBackend::S3);
        assert_eq!(config.storage.bucket, "archive");
        assert_eq!(config.storage.prefix, "search_results");
    }

    #[test]
    fn zero_max_results_rejected() {
        let mut config = AppConfig::default();
        config.search.max_results = 0;
        let err = config.validate().expect_err("invalid");
        assert!(err.to_string().contains("max_results"));
    }

    #[test]
    fn scrape_errors_surface() {
        let mut config = AppConfig::default();
        config.search.scrape.user_agents.clear();
        assert!(matches!(config.validate(), Err(AppError::Scrape(_))));
    }

    #[test]
    fn s3_requires_bucket() {
        let mut config = AppConfig::default();
        config.storage.backend = StorageBackend::S3;
        let err = config.validate().expect_err("invalid");
        assert!(err.to_string().contains("bucket"));
    }

    #[test]
    fn default_config_path_ends_with_config_toml() {
        let path = AppConfig::default_config_path();
        let path_str = path.to_string_lossy();
        assert!(path_str.ends_with("config.toml"));
        assert!(path_str.contains("serpkeep"));
    }
}
