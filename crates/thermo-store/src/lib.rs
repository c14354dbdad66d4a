//! Local persistence for hourly temperature aggregates.
//!
//! This crate provides SQLite-based storage for [`HourBucket`] records: one
//! row per calendar hour holding the min/max of every reading seen in it.
//!
//! # Features
//!
//! - Look up the latest bucket, or a bucket by its hour
//! - Insert a new bucket, widen an existing one
//! - Range scans ordered by bucket start
//! - Transactional critical sections via [`BucketStore::atomically`]
//! - `fixtures` feature: simulated data for development databases
//!
//! # Example
//!
//! ```no_run
//! use thermo_store::{BucketStore, Store};
//! use time::{Duration, OffsetDateTime};
//!
//! let store = Store::open_default()?;
//!
//! // Last 24 hours of buckets, oldest first
//! let since = OffsetDateTime::now_utc() - Duration::hours(24);
//! let buckets = store.query_range(since)?;
//! # Ok::<(), thermo_store::Error>(())
//! ```

mod error;
mod schema;
mod store;
mod traits;

#[cfg(feature = "fixtures")]
pub mod fixtures;

pub use error::{Error, Result};
pub use store::Store;
pub use thermo_types::HourBucket;
pub use traits::BucketStore;

/// Default database path following platform conventions.
///
/// - Linux: `~/.local/share/thermo/data.db`
/// - macOS: `~/Library/Application Support/thermo/data.db`
/// - Windows: `C:\Users\<user>\AppData\Local\thermo\data.db`
pub fn default_db_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("thermo")
        .join("data.db")
}
