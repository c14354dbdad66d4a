//! Error types for reading validation in thermo-types.

use thiserror::Error;

/// Errors that can occur when accepting a temperature reading.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The input could not be parsed as a number.
    #[error("Not a number: {0:?}")]
    NotANumber(String),

    /// The input parsed, but is NaN or infinite.
    #[error("Reading must be finite, got {0}")]
    NonFinite(f64),
}

/// Result type alias using thermo-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
