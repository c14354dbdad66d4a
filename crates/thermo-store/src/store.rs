//! Main store implementation.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Row};
use time::OffsetDateTime;
use tracing::{debug, info};

use thermo_types::HourBucket;

use crate::error::{Error, Result};
use crate::schema;
use crate::traits::BucketStore;

const BUCKET_COLUMNS: &str = "id, timestamp, minValue, maxValue";

/// SQLite-based store for hourly temperature buckets.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        info!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        schema::initialize(&conn)?;

        Ok(Self { conn })
    }

    /// Open the default database location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_db_path())
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    /// Count stored buckets.
    pub fn count_buckets(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM temp", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

/// Row as stored: `(id, timestamp, minValue, maxValue)`.
type BucketRow = (i64, i64, f64, f64);

fn bucket_row(row: &Row<'_>) -> rusqlite::Result<BucketRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn into_bucket((id, ts, min_value, max_value): BucketRow) -> Result<HourBucket> {
    let bucket_start =
        OffsetDateTime::from_unix_timestamp(ts).map_err(|_| Error::InvalidTimestamp(ts))?;

    Ok(HourBucket {
        id,
        bucket_start,
        min_value,
        max_value,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

impl BucketStore for Store {
    fn latest_bucket(&self) -> Result<Option<HourBucket>> {
        let sql = format!("SELECT {BUCKET_COLUMNS} FROM temp ORDER BY timestamp DESC LIMIT 1");
        let row = self.conn.query_row(&sql, [], bucket_row).optional()?;
        row.map(into_bucket).transpose()
    }

    fn bucket_at(&self, bucket_start: OffsetDateTime) -> Result<Option<HourBucket>> {
        let sql = format!("SELECT {BUCKET_COLUMNS} FROM temp WHERE timestamp = ?");
        let row = self
            .conn
            .query_row(&sql, [bucket_start.unix_timestamp()], bucket_row)
            .optional()?;
        row.map(into_bucket).transpose()
    }

    fn insert_new(&self, bucket_start: OffsetDateTime, value: f64) -> Result<HourBucket> {
        let ts = bucket_start.unix_timestamp();

        self.conn
            .execute(
                "INSERT INTO temp (timestamp, minValue, maxValue) VALUES (?1, ?2, ?2)",
                rusqlite::params![ts, value],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    Error::DuplicateBucket(ts)
                } else {
                    Error::Database(e)
                }
            })?;

        let id = self.conn.last_insert_rowid();
        info!("Opened bucket {} for hour {} at {}", id, ts, value);

        Ok(HourBucket {
            id,
            bucket_start,
            min_value: value,
            max_value: value,
        })
    }

    fn widen_bucket(&self, id: i64, new_min: f64, new_max: f64) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE temp SET minValue = ?1, maxValue = ?2 WHERE id = ?3",
            rusqlite::params![new_min, new_max, id],
        )?;

        if changed == 0 {
            return Err(Error::BucketNotFound(id));
        }

        debug!("Widened bucket {} to [{}, {}]", id, new_min, new_max);
        Ok(())
    }

    fn query_range(&self, from: OffsetDateTime) -> Result<Vec<HourBucket>> {
        let sql = format!(
            "SELECT {BUCKET_COLUMNS} FROM temp WHERE timestamp >= ? ORDER BY timestamp ASC"
        );

        debug!("Executing query: {} ({})", sql, from.unix_timestamp());

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([from.unix_timestamp()], bucket_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(into_bucket).collect()
    }

    fn atomically<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&Self) -> std::result::Result<T, E>,
        E: From<Error>,
    {
        // Dropping the guard without commit rolls the transaction back.
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| E::from(Error::from(e)))?;
        let value = f(self)?;
        tx.commit().map_err(|e| E::from(Error::from(e)))?;
        Ok(value)
    }
}
