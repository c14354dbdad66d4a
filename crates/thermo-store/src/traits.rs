//! Trait abstraction over hourly bucket storage.
//!
//! The aggregation engine is written against [`BucketStore`] rather than
//! [`Store`](crate::Store) directly, so the read-then-write decision logic
//! only ever touches storage through these operations.

use time::OffsetDateTime;

use thermo_types::HourBucket;

use crate::error::{Error, Result};

/// Operations on the persisted sequence of hourly buckets.
///
/// # Example
///
/// ```
/// use thermo_store::{BucketStore, Store};
/// use time::macros::datetime;
///
/// let store = Store::open_in_memory()?;
/// let hour = datetime!(2024-03-01 10:00 UTC);
///
/// let bucket = store.insert_new(hour, 21.0)?;
/// store.widen_bucket(bucket.id, 21.0, 22.5)?;
///
/// let latest = store.latest_bucket()?.unwrap();
/// assert_eq!(latest.max_value, 22.5);
/// # Ok::<(), thermo_store::Error>(())
/// ```
pub trait BucketStore {
    /// The bucket with the greatest start, if any exist.
    fn latest_bucket(&self) -> Result<Option<HourBucket>>;

    /// The bucket starting exactly at `bucket_start`, if any.
    fn bucket_at(&self, bucket_start: OffsetDateTime) -> Result<Option<HourBucket>>;

    /// Create `{bucket_start, value, value}`.
    ///
    /// Fails with [`Error::DuplicateBucket`] if the hour already has a bucket.
    fn insert_new(&self, bucket_start: OffsetDateTime, value: f64) -> Result<HourBucket>;

    /// Overwrite the bounds of bucket `id`.
    ///
    /// Fails with [`Error::BucketNotFound`] if the bucket does not exist.
    fn widen_bucket(&self, id: i64, new_min: f64, new_max: f64) -> Result<()>;

    /// All buckets with `bucket_start >= from`, oldest first.
    fn query_range(&self, from: OffsetDateTime) -> Result<Vec<HourBucket>>;

    /// Run `f` as one unit: its writes are committed if it returns `Ok` and
    /// discarded otherwise.
    fn atomically<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&Self) -> std::result::Result<T, E>,
        E: From<Error>;
}
