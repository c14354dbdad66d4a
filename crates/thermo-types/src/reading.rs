//! Reading validation and the optional physical clamp.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ParseResult};

/// Default lower clamp bound in degrees Celsius.
pub const DEFAULT_CLAMP_MIN: f64 = 10.0;
/// Default upper clamp bound in degrees Celsius.
pub const DEFAULT_CLAMP_MAX: f64 = 30.0;

/// Accept a reading only if it is a finite real number.
///
/// # Examples
///
/// ```
/// use thermo_types::{ParseError, validate_reading};
///
/// assert_eq!(validate_reading(21.5), Ok(21.5));
/// assert!(matches!(validate_reading(f64::NAN), Err(ParseError::NonFinite(_))));
/// ```
pub fn validate_reading(value: f64) -> ParseResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParseError::NonFinite(value))
    }
}

/// Parse a textual reading such as `"19.9"`.
///
/// Surrounding whitespace is ignored. `"NaN"` and `"inf"` parse as numbers
/// but are rejected as non-finite.
pub fn parse_reading(raw: &str) -> ParseResult<f64> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| ParseError::NotANumber(raw.to_string()))?;
    validate_reading(value)
}

/// Optional clamp of incoming readings to a physical range.
///
/// Disabled by default: readings are stored as received.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClampPolicy {
    /// Whether to clamp readings before they are recorded.
    pub clamp: bool,
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl Default for ClampPolicy {
    fn default() -> Self {
        Self {
            clamp: false,
            min: DEFAULT_CLAMP_MIN,
            max: DEFAULT_CLAMP_MAX,
        }
    }
}

impl ClampPolicy {
    /// A policy that clamps to `[min, max]`.
    pub fn enabled(min: f64, max: f64) -> Self {
        Self {
            clamp: true,
            min,
            max,
        }
    }

    /// Apply the policy to a value.
    ///
    /// Returns `value` unchanged when clamping is disabled.
    #[must_use]
    pub fn apply(&self, value: f64) -> f64 {
        if self.clamp {
            value.max(self.min).min(self.max)
        } else {
            value
        }
    }

    /// Whether the bounds form a usable range.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min < self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reading_accepts_numbers() {
        assert_eq!(parse_reading("19.9"), Ok(19.9));
        assert_eq!(parse_reading(" -3 "), Ok(-3.0));
        assert_eq!(parse_reading("1e1"), Ok(10.0));
    }

    #[test]
    fn test_parse_reading_rejects_text() {
        assert_eq!(
            parse_reading("abc"),
            Err(ParseError::NotANumber("abc".to_string()))
        );
        assert!(matches!(parse_reading(""), Err(ParseError::NotANumber(_))));
    }

    #[test]
    fn test_parse_reading_rejects_non_finite() {
        assert!(matches!(parse_reading("NaN"), Err(ParseError::NonFinite(_))));
        assert!(matches!(parse_reading("inf"), Err(ParseError::NonFinite(_))));
        assert!(matches!(
            parse_reading("-infinity"),
            Err(ParseError::NonFinite(_))
        ));
    }

    #[test]
    fn test_clamp_disabled_by_default() {
        let policy = ClampPolicy::default();
        assert!(!policy.clamp);
        assert_eq!(policy.apply(42.0), 42.0);
        assert_eq!(policy.apply(-5.0), -5.0);
    }

    #[test]
    fn test_clamp_enabled() {
        let policy = ClampPolicy::enabled(10.0, 30.0);
        assert_eq!(policy.apply(42.0), 30.0);
        assert_eq!(policy.apply(-5.0), 10.0);
        assert_eq!(policy.apply(21.5), 21.5);
    }

    #[test]
    fn test_clamp_policy_validity() {
        assert!(ClampPolicy::default().is_valid());
        assert!(!ClampPolicy::enabled(30.0, 10.0).is_valid());
        assert!(!ClampPolicy::enabled(10.0, 10.0).is_valid());
        assert!(!ClampPolicy::enabled(f64::NAN, 10.0).is_valid());
    }

    #[test]
    fn test_parse_error_display() {
        let err = parse_reading("abc").unwrap_err();
        assert!(err.to_string().contains("abc"));
        let err = validate_reading(f64::INFINITY).unwrap_err();
        assert!(err.to_string().contains("finite"));
    }
}
