//! Hourly aggregation of incoming readings.
//!
//! For every reading the engine decides whether to open a new hourly bucket
//! or widen the bounds of the latest one:
//!
//! 1. The reading's timestamp is truncated to its hour.
//! 2. If there is no latest bucket, or the latest bucket belongs to another
//!    hour, a new bucket `{value, value}` is opened.
//! 3. Otherwise the latest bucket is widened to cover the value. A value
//!    already inside the bounds leaves the bucket untouched.
//! 4. The live reading is replaced in every case.
//!
//! Membership is decided by the reading's own timestamp, never by the wall
//! clock. A reading older than the latest bucket therefore opens a bucket for
//! its own hour instead of widening the latest one.
//!
//! # Concurrency
//!
//! The lookup and the following insert or widen form one critical section:
//! the store mutex is held for the whole sequence and the writes run inside a
//! single SQLite transaction. Two readings for the same hour can therefore
//! never both open a bucket. Should an insert still collide with an existing
//! bucket (for example one written by another process), the engine widens
//! that bucket instead.

use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use thermo_store::BucketStore;
use thermo_types::{HourBucket, LiveReading, ParseError, parse_reading, truncate_to_hour, validate_reading};

use crate::live::LiveReadingCell;

/// What a recorded reading did to the bucket sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// A new bucket was opened for the reading's hour.
    Created(HourBucket),
    /// The bucket's bounds were widened; holds the updated bucket.
    Widened(HourBucket),
    /// The value was already inside the bucket's bounds.
    Unchanged(HourBucket),
}

impl Effect {
    /// The bucket the reading landed in, as it is now stored.
    pub fn bucket(&self) -> &HourBucket {
        match self {
            Effect::Created(b) | Effect::Widened(b) | Effect::Unchanged(b) => b,
        }
    }
}

/// Aggregation errors.
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    /// The reading is not a finite number.
    #[error("Invalid reading: {0}")]
    InvalidReading(#[from] ParseError),
    /// The bucket to widen no longer exists.
    #[error("Bucket {0} disappeared before it could be widened")]
    NotFound(i64),
    /// The underlying store failed.
    #[error("Storage failure: {0}")]
    Storage(thermo_store::Error),
}

impl From<thermo_store::Error> for AggregateError {
    fn from(e: thermo_store::Error) -> Self {
        match e {
            thermo_store::Error::BucketNotFound(id) => AggregateError::NotFound(id),
            other => AggregateError::Storage(other),
        }
    }
}

/// Records readings into hourly buckets and keeps the live reading current.
pub struct AggregationEngine<S> {
    store: Arc<Mutex<S>>,
    live: Arc<LiveReadingCell>,
}

impl<S: BucketStore> AggregationEngine<S> {
    /// Create an engine over a shared store and live-reading cell.
    pub fn new(store: Arc<Mutex<S>>, live: Arc<LiveReadingCell>) -> Self {
        Self { store, live }
    }

    /// Record a reading observed at `observed_at`.
    ///
    /// # Errors
    ///
    /// - [`AggregateError::InvalidReading`] if `reading` is NaN or infinite;
    ///   nothing is written and the live reading is left as it was.
    /// - [`AggregateError::NotFound`] if the bucket to widen vanished.
    /// - [`AggregateError::Storage`] if the store failed.
    pub async fn record(
        &self,
        reading: f64,
        observed_at: OffsetDateTime,
    ) -> Result<Effect, AggregateError> {
        let reading = validate_reading(reading)?;

        let store = self.store.lock().await;
        let effect = store.atomically(|s| apply(s, reading, observed_at))?;
        self.live.set(LiveReading::new(observed_at, reading));
        drop(store);

        Ok(effect)
    }

    /// Parse and record a textual reading such as `"19.9"`.
    pub async fn record_raw(
        &self,
        raw: &str,
        observed_at: OffsetDateTime,
    ) -> Result<Effect, AggregateError> {
        let reading = parse_reading(raw)?;
        self.record(reading, observed_at).await
    }
}

/// Apply one reading to the store.
///
/// This is the decision step of [`AggregationEngine::record`] without
/// locking or the live reading; callers must provide mutual exclusion.
pub fn apply<S: BucketStore + ?Sized>(
    store: &S,
    reading: f64,
    observed_at: OffsetDateTime,
) -> Result<Effect, AggregateError> {
    let bucket_start = truncate_to_hour(observed_at);

    match store.latest_bucket()? {
        Some(last) if last.bucket_start == bucket_start => widen(store, last, reading),
        _ => match store.insert_new(bucket_start, reading) {
            Ok(bucket) => Ok(Effect::Created(bucket)),
            Err(thermo_store::Error::DuplicateBucket(ts)) => {
                warn!("Bucket for hour {} already exists, widening it instead", ts);
                let existing = store
                    .bucket_at(bucket_start)?
                    .ok_or(thermo_store::Error::DuplicateBucket(ts))?;
                widen(store, existing, reading)
            }
            Err(e) => Err(e.into()),
        },
    }
}

fn widen<S: BucketStore + ?Sized>(
    store: &S,
    bucket: HourBucket,
    reading: f64,
) -> Result<Effect, AggregateError> {
    if bucket.covers(reading) {
        debug!("Reading {} within bucket {}, nothing to widen", reading, bucket.id);
        return Ok(Effect::Unchanged(bucket));
    }

    let (min_value, max_value) = bucket.widened_bounds(reading);
    store.widen_bucket(bucket.id, min_value, max_value)?;

    Ok(Effect::Widened(HourBucket {
        min_value,
        max_value,
        ..bucket
    }))
}
