//! Database schema definitions for the multicast membership store

use rusqlite::Connection;
use tracing::debug;

/// Creates all required database tables
pub fn create_all_tables(conn: &Connection) -> rusqlite::Result<()> {
    create_device_multicast_group_table(conn)?;
    Ok(())
}

/// Device to multicast-group association table
///
/// One row per (dev_eui, multicast_group_id) pair. Devices and groups are
/// managed elsewhere and referenced by key only, so there are no foreign keys.
/// dev_eui is 8 bytes, multicast_group_id is a 16-byte UUID, created_at is
/// Unix milliseconds.
pub fn create_device_multicast_group_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS device_multicast_group (
            dev_eui BLOB NOT NULL CHECK (length(dev_eui) = 8),
            multicast_group_id BLOB NOT NULL CHECK (length(multicast_group_id) = 16),
            created_at INTEGER NOT NULL,
            PRIMARY KEY (dev_eui, multicast_group_id)
        )",
        [],
    )?;

    // Lookup indexes for the two list queries
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_device_multicast_group_dev_eui
         ON device_multicast_group(dev_eui)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_device_multicast_group_group_id
         ON device_multicast_group(multicast_group_id)",
        [],
    )?;

    debug!("device_multicast_group table ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_memory_db() -> Connection {
        Connection::open_in_memory().unwrap()
    }

    fn names_of(conn: &Connection, kind: &str) -> Vec<String> {
        conn.prepare("SELECT name FROM sqlite_master WHERE type = ?1 ORDER BY name")
            .unwrap()
            .query_map([kind], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_create_all_tables() {
        let conn = in_memory_db();
        create_all_tables(&conn).unwrap();

        let tables = names_of(&conn, "table");
        assert!(tables.contains(&"device_multicast_group".to_string()));

        let indexes = names_of(&conn, "index");
        assert!(indexes.contains(&"idx_device_multicast_group_dev_eui".to_string()));
        assert!(indexes.contains(&"idx_device_multicast_group_group_id".to_string()));
    }

    #[test]
    fn test_create_is_idempotent() {
        let conn = in_memory_db();
        create_all_tables(&conn).unwrap();
        create_all_tables(&conn).unwrap();
    }

    #[test]
    fn test_pair_is_unique() {
        let conn = in_memory_db();
        create_device_multicast_group_table(&conn).unwrap();

        let insert = "INSERT INTO device_multicast_group (dev_eui, multicast_group_id, created_at)
                      VALUES (?1, ?2, ?3)";
        conn.execute(insert, rusqlite::params![[1u8; 8].as_slice(), [2u8; 16].as_slice(), 1i64])
            .unwrap();

        let result = conn.execute(
            insert,
            rusqlite::params![[1u8; 8].as_slice(), [2u8; 16].as_slice(), 2i64],
        );
        assert_eq!(
            result.unwrap_err().sqlite_error_code(),
            Some(rusqlite::ErrorCode::ConstraintViolation)
        );

        // Same device in another group is fine
        conn.execute(insert, rusqlite::params![[1u8; 8].as_slice(), [3u8; 16].as_slice(), 3i64])
            .unwrap();
    }

    #[test]
    fn test_key_lengths_checked() {
        let conn = in_memory_db();
        create_device_multicast_group_table(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO device_multicast_group (dev_eui, multicast_group_id, created_at)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![[1u8; 7].as_slice(), [2u8; 16].as_slice(), 1i64],
        );
        assert!(result.is_err());
    }
}
