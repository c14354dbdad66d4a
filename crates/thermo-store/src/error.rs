//! Error types for thermo-store.

use std::path::PathBuf;

/// Result type for thermo-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in thermo-store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database error from SQLite.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to create database directory.
    #[error("Failed to create database directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A bucket for this hour (unix timestamp) already exists.
    #[error("Bucket already exists for hour starting at {0}")]
    DuplicateBucket(i64),

    /// No bucket with this id.
    #[error("Bucket not found: {0}")]
    BucketNotFound(i64),

    /// A stored timestamp is out of range.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(i64),

    /// The `temp` table holds raw samples (`timestamp`, `value`) rather than
    /// hourly aggregates.
    #[error("Table 'temp' uses the raw-sample layout (timestamp, value); hourly aggregates are required")]
    LegacySchema,

    /// The database was written by a newer version of this crate.
    #[error("Database schema version {found} is newer than supported version {supported}")]
    UnsupportedSchemaVersion { found: i32, supported: i32 },
}
