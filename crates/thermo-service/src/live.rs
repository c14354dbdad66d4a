//! In-memory cell holding the most recent reading.

use std::sync::{PoisonError, RwLock};

use thermo_types::LiveReading;

/// Single-slot store for the last observed reading.
///
/// Written by the aggregation engine while it still holds the store lock;
/// read concurrently by any number of query handlers. Empty until the first
/// successful record after process start.
#[derive(Debug, Default)]
pub struct LiveReadingCell {
    slot: RwLock<Option<LiveReading>>,
}

impl LiveReadingCell {
    /// Create an empty cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// The last reading, if any.
    pub fn get(&self) -> Option<LiveReading> {
        *self.slot.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the last reading.
    pub fn set(&self, reading: LiveReading) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(reading);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use time::macros::datetime;

    #[test]
    fn test_empty_by_default() {
        assert!(LiveReadingCell::new().get().is_none());
    }

    #[test]
    fn test_set_overwrites() {
        let cell = LiveReadingCell::new();
        cell.set(LiveReading::new(datetime!(2024-03-01 10:05 UTC), 21.0));
        cell.set(LiveReading::new(datetime!(2024-03-01 10:40 UTC), 22.5));

        let live = cell.get().unwrap();
        assert_eq!(live.timestamp, datetime!(2024-03-01 10:40 UTC));
        assert_eq!(live.value, 22.5);
    }

    #[test]
    fn test_concurrent_readers_see_whole_values() {
        let cell = Arc::new(LiveReadingCell::new());
        let ts = datetime!(2024-03-01 10:00 UTC);

        let writer = {
            let cell = Arc::clone(&cell);
            std::thread::spawn(move || {
                for i in 0..1000 {
                    cell.set(LiveReading::new(ts + time::Duration::seconds(i), i as f64));
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let cell = Arc::clone(&cell);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        if let Some(r) = cell.get() {
                            // Timestamp and value are always written together
                            assert_eq!((r.timestamp - ts).whole_seconds() as f64, r.value);
                        }
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for r in readers {
            r.join().unwrap();
        }
    }
}
