//! Shared types for hourly temperature aggregation.
//!
//! This crate provides the data model used by both the storage layer
//! (thermo-store) and the HTTP service (thermo-service).
//!
//! # Features
//!
//! - [`HourBucket`]: an hour-aligned min/max aggregate
//! - [`LiveReading`]: the most recently observed value
//! - [`Clock`]: an injectable time source with a [`SystemClock`] and a
//!   [`FixedClock`] for tests
//! - Hour truncation and reading validation helpers
//!
//! # Example
//!
//! ```
//! use thermo_types::{parse_reading, truncate_to_hour};
//! use time::macros::datetime;
//!
//! let start = truncate_to_hour(datetime!(2024-03-01 10:42:17 +01:00));
//! assert_eq!(start, datetime!(2024-03-01 10:00:00 +01:00));
//!
//! assert_eq!(parse_reading("19.9").unwrap(), 19.9);
//! assert!(parse_reading("abc").is_err());
//! ```

pub mod clock;
pub mod error;
pub mod reading;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock, truncate_to_hour};
pub use error::{ParseError, ParseResult};
pub use reading::{ClampPolicy, parse_reading, validate_reading};
pub use types::{HourBucket, LiveReading};

/// Number of seconds in one hour.
pub const SECONDS_PER_HOUR: i64 = 60 * 60;

/// Number of seconds in one day.
pub const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;
