//! SQLite DDL for the search history database.
//!
//! All `CREATE TABLE` / `CREATE INDEX` statements live here so they are
//! reviewable and testable in isolation.

use rusqlite::Connection;

/// Current schema version, stamped into `schema_meta` on first open.
pub(crate) const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Complete DDL for the history database.
///
/// Uses `IF NOT EXISTS` throughout so `apply_schema` is idempotent.
pub(crate) const SCHEMA_SQL: &str = r#"
-- Enable WAL mode for concurrent reads during writes.
PRAGMA journal_mode = WAL;

-- Schema version tracking.
CREATE TABLE IF NOT EXISTS schema_meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- One row per saved search.
CREATE TABLE IF NOT EXISTS search_records (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    query         TEXT NOT NULL,
    timestamp     INTEGER NOT NULL,   -- unix epoch milliseconds, UTC
    artifact_key  TEXT NOT NULL,      -- artifact basename
    result_count  INTEGER NOT NULL DEFAULT 0 CHECK (result_count >= 0)
);

CREATE INDEX IF NOT EXISTS idx_records_timestamp    ON search_records(timestamp);
CREATE INDEX IF NOT EXISTS idx_records_artifact_key ON search_records(artifact_key);
"#;

/// Apply the full schema to an open connection.
///
/// Safe to call multiple times.
pub(crate) fn apply_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', ?1)",
        rusqlite::params![CURRENT_SCHEMA_VERSION.to_string()],
    )?;
    Ok(())
}

/// Read the schema version stamp, if present.
pub(crate) fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<u32>> {
    let mut stmt = conn.prepare("SELECT value FROM schema_meta WHERE key = 'schema_version'")?;
    let mut rows = stmt.query([])?;
    match rows.next()? {
        Some(row) => {
            let value: String = row.get(0)?;
            Ok(value.parse().ok())
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_applies_twice() {
        let conn = Connection::open_in_memory().expect("open");
        apply_schema(&conn).expect("first");
        apply_schema(&conn).expect("second");
        assert_eq!(
            read_schema_version(&conn).expect("version"),
            Some(CURRENT_SCHEMA_VERSION)
        );
    }

    #[test]
    fn negative_counts_rejected() {
        let conn = Connection::open_in_memory().expect("open");
        apply_schema(&conn).expect("schema");
        let result = conn.execute(
            "INSERT INTO search_records (query, timestamp, artifact_key, result_count) \
             VALUES ('q', 0, 'a.txt', -1)",
            [],
        );
        assert!(result.is_err());
    }
}
