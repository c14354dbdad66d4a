//! Database schema and migrations.

use rusqlite::Connection;

use crate::error::{Error, Result};

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema.
pub fn initialize(conn: &Connection) -> Result<()> {
    let version = get_schema_version(conn)?;

    if version == 0 {
        // Fresh database, or one written before versioning existed
        ensure_aggregate_layout(conn)?;
        create_schema_v1(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if version > SCHEMA_VERSION {
        return Err(Error::UnsupportedSchemaVersion {
            found: version,
            supported: SCHEMA_VERSION,
        });
    }

    Ok(())
}

/// Get the current schema version.
fn get_schema_version(conn: &Connection) -> Result<i32> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='schema_version'",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: i32 =
        conn.query_row("SELECT version FROM schema_version", [], |row| row.get(0))?;

    Ok(version)
}

/// Set the schema version.
fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version) VALUES (1, ?)",
        [version],
    )?;
    Ok(())
}

/// Refuse a pre-existing `temp` table that stores raw samples.
fn ensure_aggregate_layout(conn: &Connection) -> Result<()> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('temp')")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if !columns.is_empty() && !columns.iter().any(|c| c == "minValue") {
        return Err(Error::LegacySchema);
    }

    Ok(())
}

/// Create the initial schema (version 1).
///
/// Column names match databases written by earlier deployments so existing
/// data stays readable.
fn create_schema_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Schema version tracking
        CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL
        );

        -- Hourly aggregates, one row per hour
        CREATE TABLE IF NOT EXISTS temp (
            id INTEGER PRIMARY KEY NOT NULL,
            timestamp INTEGER NOT NULL,
            minValue REAL NOT NULL,
            maxValue REAL NOT NULL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_temp_timestamp
            ON temp(timestamp);
        "#,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_initialize_fresh_database() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let tables = table_names(&conn);
        assert!(tables.contains(&"temp".to_string()));
        assert!(tables.contains(&"schema_version".to_string()));
    }

    #[test]
    fn test_schema_version_tracking() {
        let conn = Connection::open_in_memory().unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), 0);

        initialize(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);

        // Second initialization is a no-op
        initialize(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_unversioned_aggregate_table_is_adopted() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE temp (id INTEGER PRIMARY KEY NOT NULL, timestamp INTEGER, minValue REAL, maxValue REAL);
             INSERT INTO temp (timestamp, minValue, maxValue) VALUES (1709287200, 21.0, 22.5);",
        )
        .unwrap();

        initialize(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM temp", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        set_schema_version(&conn, SCHEMA_VERSION + 1).unwrap();

        let result = initialize(&conn);
        assert!(matches!(
            result,
            Err(Error::UnsupportedSchemaVersion { found, supported })
                if found == SCHEMA_VERSION + 1 && supported == SCHEMA_VERSION
        ));
    }

    #[test]
    fn test_raw_sample_table_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE temp (id INTEGER PRIMARY KEY NOT NULL, timestamp INTEGER, value REAL)",
        )
        .unwrap();

        let result = initialize(&conn);
        assert!(matches!(result, Err(Error::LegacySchema)));
    }

    #[test]
    fn test_unique_index_on_timestamp() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        conn.execute(
            "INSERT INTO temp (timestamp, minValue, maxValue) VALUES (3600, 1.0, 1.0)",
            [],
        )
        .unwrap();
        let dup = conn.execute(
            "INSERT INTO temp (timestamp, minValue, maxValue) VALUES (3600, 2.0, 2.0)",
            [],
        );
        assert!(dup.is_err());
    }
}
