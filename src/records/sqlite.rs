//! SQLite-backed search history.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};

use super::schema::{apply_schema, read_schema_version};
use super::{MAX_QUERY_CHARS, RecordError, SearchRecord};
use crate::text::truncate_chars;

const SELECT_COLUMNS: &str = "SELECT id, query, timestamp, artifact_key, result_count FROM search_records";

/// Search history store.
///
/// Thread-safe via an internal `Mutex<Connection>`; every call is short.
pub struct RecordStore {
    conn: Mutex<Connection>,
}

impl RecordStore {
    /// Open (or create) the database at `path`, creating parent directories.
    ///
    /// Applies the schema if the database is new.
    pub fn open(path: &Path) -> Result<Self, RecordError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| RecordError::Io(e.to_string()))?;
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Private in-memory database, for tests and dry runs.
    pub fn open_in_memory() -> Result<Self, RecordError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, RecordError> {
        apply_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Read the current schema version from the database.
    pub fn schema_version(&self) -> Result<Option<u32>, RecordError> {
        let conn = self.lock()?;
        Ok(read_schema_version(&conn)?)
    }

    /// Record a saved search, timestamped now.
    ///
    /// Queries longer than 200 characters are cut to fit.
    pub fn create(
        &self,
        query: &str,
        artifact_key: &str,
        result_count: u32,
    ) -> Result<SearchRecord, RecordError> {
        self.create_at(query, artifact_key, result_count, Utc::now())
    }

    /// [`RecordStore::create`] with an explicit timestamp.
    pub fn create_at(
        &self,
        query: &str,
        artifact_key: &str,
        result_count: u32,
        timestamp: DateTime<Utc>,
    ) -> Result<SearchRecord, RecordError> {
        let query = truncate_chars(query, MAX_QUERY_CHARS).to_string();
        // Millisecond precision is what the column holds.
        let timestamp = to_millis_precision(timestamp);

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO search_records (query, timestamp, artifact_key, result_count) \
             VALUES (?1, ?2, ?3, ?4)",
            params![query, timestamp.timestamp_millis(), artifact_key, result_count],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(id, artifact_key, "search recorded");

        Ok(SearchRecord {
            id,
            query,
            timestamp,
            artifact_key: artifact_key.to_string(),
            result_count,
        })
    }

    /// The `limit` most recent records, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<SearchRecord>, RecordError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.query_records(
            &format!("{SELECT_COLUMNS} ORDER BY timestamp DESC, id DESC LIMIT ?1"),
            params![limit],
        )
    }

    /// Every record, newest first.
    pub fn all(&self) -> Result<Vec<SearchRecord>, RecordError> {
        self.query_records(
            &format!("{SELECT_COLUMNS} ORDER BY timestamp DESC, id DESC"),
            params![],
        )
    }

    /// Delete every record pointing at `artifact_key`, returning how many went.
    pub fn delete_by_artifact_key(&self, artifact_key: &str) -> Result<usize, RecordError> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM search_records WHERE artifact_key = ?1",
            params![artifact_key],
        )?;
        tracing::debug!(artifact_key, deleted, "records deleted");
        Ok(deleted)
    }

    fn query_records(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<SearchRecord>, RecordError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, row_to_record)?;

        let mut records = Vec::new();
        for r in rows {
            records.push(r?);
        }
        Ok(records)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, RecordError> {
        self.conn
            .lock()
            .map_err(|e| RecordError::Lock(e.to_string()))
    }
}

fn to_millis_precision(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ts.timestamp_millis()).unwrap_or(ts)
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<SearchRecord> {
    let millis: i64 = row.get(2)?;
    Ok(SearchRecord {
        id: row.get(0)?,
        query: row.get(1)?,
        timestamp: DateTime::from_timestamp_millis(millis).unwrap_or_default(),
        artifact_key: row.get(3)?,
        result_count: row.get(4)?,
    })
}
