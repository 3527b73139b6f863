//! Database initialization and startup
//!
//! Opens the SQLite database described by a [`StoreConfig`] and ensures the
//! membership table exists.

use rusqlite::Connection;
use thiserror::Error;
use tracing::debug;

use super::schema::create_all_tables;
use crate::config::StoreConfig;

/// Error type for database startup
#[derive(Debug, Error)]
pub enum StartError {
    /// Database directory could not be created
    #[error("cannot create database directory: {0}")]
    Io(#[from] std::io::Error),
    /// SQLite error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Opens the database and ensures all required tables exist
///
/// # Errors
/// - `StartError::Io` if the parent directory of `db_path` can't be created
/// - `StartError::Database` for SQLite errors
pub fn start_db(config: &StoreConfig) -> Result<Connection, StartError> {
    let conn = match &config.db_path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            Connection::open(path)?
        }
        None => Connection::open_in_memory()?,
    };

    conn.busy_timeout(config.busy_timeout)?;

    // WAL doesn't apply to in-memory databases
    if config.wal && config.db_path.is_some() {
        // PRAGMA returns the new mode, so we use query_row instead of execute
        let _: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    }

    // Schema creation is idempotent (`CREATE TABLE IF NOT EXISTS`)
    create_all_tables(&conn)?;

    debug!(path = ?config.db_path, "membership database opened");
    Ok(conn)
}

/// Create an in-memory database for testing
pub fn start_memory_db() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    create_all_tables(&conn)?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_memory_db() {
        let conn = start_memory_db().unwrap();
        assert!(table_names(&conn).contains(&"device_multicast_group".to_string()));
    }

    #[test]
    fn test_start_db_in_memory() {
        let conn = start_db(&StoreConfig::for_testing()).unwrap();
        assert!(table_names(&conn).contains(&"device_multicast_group".to_string()));
    }

    #[test]
    fn test_start_db_file_uses_wal() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new().with_db_path(dir.path().join("multicast.db"));

        let conn = start_db(&config).unwrap();
        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[test]
    fn test_start_db_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("multicast.db");

        start_db(&StoreConfig::new().with_db_path(&path)).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_reopening_db_preserves_data() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new().with_db_path(dir.path().join("reopen.db"));

        // First open - create and insert
        {
            let conn = start_db(&config).unwrap();
            conn.execute(
                "INSERT INTO device_multicast_group (dev_eui, multicast_group_id, created_at)
                 VALUES (?1, ?2, ?3)",
                rusqlite::params![[1u8; 8].as_slice(), [2u8; 16].as_slice(), 1704067200000i64],
            )
            .unwrap();
        }

        // Second open - data should still be there
        {
            let conn = start_db(&config).unwrap();
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM device_multicast_group", [], |row| row.get(0))
                .unwrap();
            assert_eq!(count, 1, "data should be preserved, table not recreated");
        }
    }

    #[test]
    fn test_error_display() {
        let err = StartError::Database(rusqlite::Error::InvalidQuery);
        assert!(err.to_string().starts_with("database error:"));
    }
}
