//! Core data types for aggregated temperature data.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One hour-aligned aggregate holding the min/max of all readings in that hour.
///
/// `bucket_start` is the natural key: it is unique across the store and never
/// changes after creation. Only `min_value` and `max_value` may be widened.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HourBucket {
    /// Surrogate key assigned by the store.
    pub id: i64,
    /// Start of the hour (minute, second and nanosecond are zero).
    #[cfg_attr(feature = "serde", serde(with = "time::serde::timestamp"))]
    pub bucket_start: OffsetDateTime,
    /// Lowest value recorded in this hour.
    pub min_value: f64,
    /// Highest value recorded in this hour.
    pub max_value: f64,
}

impl HourBucket {
    /// Whether `value` already lies within `[min_value, max_value]`.
    #[must_use]
    pub fn covers(&self, value: f64) -> bool {
        self.min_value <= value && value <= self.max_value
    }

    /// The bounds this bucket would have after also covering `value`.
    #[must_use]
    pub fn widened_bounds(&self, value: f64) -> (f64, f64) {
        (self.min_value.min(value), self.max_value.max(value))
    }
}

/// The most recently observed reading.
///
/// Held in memory only; it is reset on process restart.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LiveReading {
    /// When the reading was observed.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::timestamp"))]
    pub timestamp: OffsetDateTime,
    /// Temperature value.
    pub value: f64,
}

impl LiveReading {
    /// Create a new live reading.
    pub fn new(timestamp: OffsetDateTime, value: f64) -> Self {
        Self { timestamp, value }
    }
}
