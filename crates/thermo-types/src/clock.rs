//! Time sources and hour alignment.
//!
//! Bucket boundaries are computed from timestamps, never from the wall clock
//! directly, so every component that needs "now" takes a [`Clock`].

use std::sync::{Mutex, PoisonError};

use time::{Duration, OffsetDateTime, UtcOffset};

/// A source of the current time.
pub trait Clock: Send + Sync {
    /// The current time, in the offset buckets are aligned to.
    fn now(&self) -> OffsetDateTime;
}

/// Truncate a timestamp to the start of its hour in its own offset.
///
/// Minutes, seconds and sub-second precision are dropped; year, month, day
/// and hour are kept.
///
/// # Examples
///
/// ```
/// use thermo_types::truncate_to_hour;
/// use time::macros::datetime;
///
/// assert_eq!(
///     truncate_to_hour(datetime!(2024-03-01 23:59:59.999 +05:30)),
///     datetime!(2024-03-01 23:00 +05:30),
/// );
/// ```
#[must_use]
pub fn truncate_to_hour(ts: OffsetDateTime) -> OffsetDateTime {
    let into_hour = Duration::minutes(i64::from(ts.minute()))
        + Duration::seconds(i64::from(ts.second()))
        + Duration::nanoseconds(i64::from(ts.nanosecond()));
    ts - into_hour
}

/// Wall clock reporting time in a fixed local offset.
///
/// The offset is resolved once, at construction. On Unix the local offset can
/// only be queried soundly while the process is single-threaded, so build the
/// clock before starting the async runtime.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: UtcOffset,
}

impl SystemClock {
    /// Create a clock using the given UTC offset.
    pub fn with_offset(offset: UtcOffset) -> Self {
        Self { offset }
    }

    /// Create a clock using the system's local offset, falling back to UTC
    /// when it cannot be determined.
    pub fn local() -> Self {
        Self::with_offset(UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC))
    }

    /// The offset this clock reports time in.
    pub fn offset(&self) -> UtcOffset {
        self.offset
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::with_offset(UtcOffset::UTC)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.offset)
    }
}

/// Manually driven clock for tests and replays.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<OffsetDateTime>,
}

impl FixedClock {
    /// Create a clock frozen at `now`.
    pub fn new(now: OffsetDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Move the clock to `now`.
    pub fn set(&self, now: OffsetDateTime) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    /// Move the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use time::macros::{datetime, offset};

    #[test]
    fn test_truncate_keeps_hour_boundary() {
        let start = datetime!(2024-03-01 10:00 UTC);
        assert_eq!(truncate_to_hour(start), start);
    }

    #[test]
    fn test_truncate_drops_minutes_and_seconds() {
        assert_eq!(
            truncate_to_hour(datetime!(2024-03-01 10:40:12.5 UTC)),
            datetime!(2024-03-01 10:00 UTC)
        );
    }

    #[test]
    fn test_truncate_uses_own_offset() {
        // 10:40 UTC is 16:10 in +05:30, whose hour starts at 10:30 UTC.
        let local = datetime!(2024-03-01 10:40 UTC).to_offset(offset!(+05:30));
        let start = truncate_to_hour(local);
        assert_eq!(start, datetime!(2024-03-01 16:00 +05:30));
        assert_eq!(start, datetime!(2024-03-01 10:30 UTC));
    }

    #[test]
    fn test_system_clock_reports_configured_offset() {
        let clock = SystemClock::with_offset(offset!(+02:00));
        assert_eq!(clock.now().offset(), offset!(+02:00));
        assert_eq!(clock.offset(), offset!(+02:00));
    }

    #[test]
    fn test_system_clock_default_is_utc() {
        assert_eq!(SystemClock::default().now().offset(), UtcOffset::UTC);
    }

    #[test]
    fn test_fixed_clock_set_and_advance() {
        let clock = FixedClock::new(datetime!(2024-03-01 10:05 UTC));
        assert_eq!(clock.now(), datetime!(2024-03-01 10:05 UTC));

        clock.advance(Duration::minutes(35));
        assert_eq!(clock.now(), datetime!(2024-03-01 10:40 UTC));

        clock.set(datetime!(2024-03-02 00:00 UTC));
        assert_eq!(clock.now(), datetime!(2024-03-02 00:00 UTC));
    }

    proptest! {
        #[test]
        fn prop_truncate_is_idempotent_and_within_hour(secs in 0i64..4_102_444_800) {
            let ts = OffsetDateTime::from_unix_timestamp(secs).unwrap();
            let start = truncate_to_hour(ts);

            prop_assert_eq!(truncate_to_hour(start), start);
            prop_assert_eq!(start.minute(), 0);
            prop_assert_eq!(start.second(), 0);
            prop_assert!(start <= ts);
            prop_assert!(ts - start < Duration::hours(1));
        }
    }
}
