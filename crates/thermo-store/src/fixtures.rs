//! Simulated bucket data for development databases.
//!
//! Nothing in here is used on the ingestion or query paths. It exists so a
//! chart front-end can be developed against a populated database without a
//! sensor attached.

use rand::Rng;
use time::{Duration, OffsetDateTime};
use tracing::info;

use thermo_types::{ClampPolicy, truncate_to_hour};

use crate::error::{Error, Result};
use crate::traits::BucketStore;

/// Largest step, in degrees, the walk takes between consecutive hours.
const MAX_STEP: f64 = 5.0;
/// Largest spread between an hour's minimum and maximum.
const MAX_SPREAD: f64 = 5.0;

/// One simulated hourly aggregate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedBucket {
    pub bucket_start: OffsetDateTime,
    pub min_value: f64,
    pub max_value: f64,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Longest history, in days, the seed helpers are meant to produce.
pub const MAX_SEED_DAYS: u32 = 3660;

/// Generate `hours` consecutive buckets ending with the hour containing `end`.
///
/// Values follow a bounded random walk and are clamped to `range` regardless
/// of whether `range.clamp` is set. Output is ordered oldest first. The series
/// stops early at the earliest representable hour.
pub fn simulate_hourly<R: Rng>(
    end: OffsetDateTime,
    hours: u32,
    range: ClampPolicy,
    rng: &mut R,
) -> Vec<SimulatedBucket> {
    let range = ClampPolicy::enabled(range.min, range.max);
    let last_hour = truncate_to_hour(end);
    let mut level = round2(rng.random_range(range.min..=range.max));
    let mut buckets = Vec::with_capacity(hours.min(MAX_SEED_DAYS * 24) as usize);

    for i in 0..hours {
        let Some(bucket_start) = last_hour.checked_sub(Duration::hours(i64::from(i))) else {
            break;
        };
        let low = level - rng.random_range(1.0..MAX_STEP);
        let high = level + rng.random_range(1.0..MAX_STEP);
        let min_value = range.apply(round2(rng.random_range(low..high)));
        let max_value = range.apply(round2(min_value + rng.random_range(1.0..MAX_SPREAD)));

        buckets.push(SimulatedBucket {
            bucket_start,
            min_value,
            max_value,
        });
        level = min_value;
    }

    buckets.reverse();
    buckets
}

/// Insert simulated buckets in a single transaction.
///
/// Returns the number of buckets written. Fails without writing anything if
/// any hour already has a bucket.
pub fn seed<S: BucketStore>(store: &S, buckets: &[SimulatedBucket]) -> Result<usize> {
    let written = store.atomically(|s| {
        for b in buckets {
            let bucket = s.insert_new(b.bucket_start, b.min_value)?;
            if b.max_value != b.min_value {
                s.widen_bucket(bucket.id, b.min_value, b.max_value)?;
            }
        }
        Ok::<_, Error>(buckets.len())
    })?;

    info!("Seeded {} simulated buckets", written);
    Ok(written)
}
