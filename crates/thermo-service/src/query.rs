//! Read side: live reading and chart series.

use std::sync::Arc;

use time::{Duration, OffsetDateTime, PrimitiveDateTime};
use tokio::sync::Mutex;
use tracing::debug;

use thermo_store::BucketStore;
use thermo_types::{Clock, HourBucket, LiveReading, SECONDS_PER_DAY, truncate_to_hour};

use crate::live::LiveReadingCell;

/// Start of a chart window `window_days` days back from the hour containing `now`.
///
/// A window reaching past the earliest representable date starts at that
/// date, so it covers every stored bucket.
pub fn window_start(now: OffsetDateTime, window_days: u32) -> OffsetDateTime {
    truncate_to_hour(now)
        .checked_sub(Duration::seconds(i64::from(window_days) * SECONDS_PER_DAY))
        .unwrap_or(PrimitiveDateTime::MIN.assume_utc())
}

/// Read-only access to aggregated data.
pub struct QueryService<S> {
    store: Arc<Mutex<S>>,
    live: Arc<LiveReadingCell>,
    clock: Arc<dyn Clock>,
}

impl<S: BucketStore> QueryService<S> {
    /// Create a query service sharing the engine's store and live cell.
    pub fn new(store: Arc<Mutex<S>>, live: Arc<LiveReadingCell>, clock: Arc<dyn Clock>) -> Self {
        Self { store, live, clock }
    }

    /// The last recorded reading since process start, if any.
    pub fn current_reading(&self) -> Option<LiveReading> {
        self.live.get()
    }

    /// Buckets from the last `window_days` days, oldest first.
    ///
    /// The window is measured from the start of the current hour, so it
    /// lines up with bucket boundaries.
    pub async fn chart_series(&self, window_days: u32) -> thermo_store::Result<Vec<HourBucket>> {
        let from = window_start(self.clock.now(), window_days);
        debug!("Chart series for {} day(s) from {}", window_days, from);

        let store = self.store.lock().await;
        store.query_range(from)
    }
}
