//! Pixel and percentage lengths as committed to the property store.
//!
//! Committed geometry is stored as CSS-like strings: `"37.5000%"` for
//! percentages (always four decimals) and `"120px"` for raw pixels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Decimal places kept for committed percentages.
pub const PERCENT_DECIMALS: i32 = 4;

/// A length in one of the two units the engine writes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Length {
    Px(f64),
    Percent(f64),
}

impl Length {
    /// Resolve to pixels against a parent dimension.
    pub fn to_pixels(self, parent: f64) -> f64 {
        match self {
            Length::Px(px) => px,
            Length::Percent(pct) => pct / 100.0 * parent,
        }
    }

    pub fn is_percent(self) -> bool {
        matches!(self, Length::Percent(_))
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Px(px) => write!(f, "{}px", px),
            Length::Percent(pct) => {
                write!(f, "{:.*}%", PERCENT_DECIMALS as usize, pct)
            }
        }
    }
}

/// Error parsing a length string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid length: {0:?}")]
pub struct ParseLengthError(pub String);

impl FromStr for Length {
    type Err = ParseLengthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (number, percent) = if let Some(n) = trimmed.strip_suffix('%') {
            (n, true)
        } else if let Some(n) = trimmed.strip_suffix("px") {
            (n, false)
        } else {
            (trimmed, false)
        };
        let value: f64 = number
            .trim()
            .parse()
            .map_err(|_| ParseLengthError(s.to_string()))?;
        if !value.is_finite() {
            return Err(ParseLengthError(s.to_string()));
        }
        Ok(if percent {
            Length::Percent(value)
        } else {
            Length::Px(value)
        })
    }
}

impl TryFrom<String> for Length {
    type Error = ParseLengthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Length> for String {
    fn from(length: Length) -> Self {
        length.to_string()
    }
}

/// Round a percentage to [`PERCENT_DECIMALS`] places.
pub fn round_percent(value: f64) -> f64 {
    let factor = 10f64.powi(PERCENT_DECIMALS);
    let rounded = (value * factor).round() / factor;
    // Avoid committing "-0.0000%"
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Convert pixels to a percentage of `parent`.
///
/// Returns `None` for a zero, negative or non-finite parent dimension so a
/// degenerate container never produces `NaN` or infinite values.
pub fn to_percent(pixels: f64, parent: f64) -> Option<f64> {
    if !parent.is_finite() || parent <= 0.0 || !pixels.is_finite() {
        return None;
    }
    Some(round_percent(pixels / parent * 100.0))
}

/// [`to_percent`] wrapped as a [`Length`].
pub fn percent_of(pixels: f64, parent: f64) -> Option<Length> {
    to_percent(pixels, parent).map(Length::Percent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_formatting() {
        assert_eq!(Length::Percent(37.5).to_string(), "37.5000%");
        assert_eq!(Length::Percent(0.0).to_string(), "0.0000%");
        assert_eq!(Length::Px(120.0).to_string(), "120px");
        assert_eq!(Length::Px(12.5).to_string(), "12.5px");
    }

    #[test]
    fn test_to_percent_rounds_to_four_places() {
        assert_eq!(to_percent(375.0, 1000.0), Some(37.5));
        assert_eq!(to_percent(1.0, 3.0), Some(33.3333));
        assert_eq!(to_percent(2.0, 3.0), Some(66.6667));
    }

    #[test]
    fn test_degenerate_parent() {
        assert_eq!(to_percent(50.0, 0.0), None);
        assert_eq!(to_percent(50.0, -10.0), None);
        assert_eq!(to_percent(50.0, f64::NAN), None);
        assert_eq!(to_percent(f64::INFINITY, 100.0), None);
    }

    #[test]
    fn test_negative_zero_is_normalized() {
        let pct = to_percent(-0.00001, 1000.0).unwrap();
        assert_eq!(Length::Percent(pct).to_string(), "0.0000%");
    }

    #[test]
    fn test_percent_conversion_is_idempotent() {
        // Pixel -> percent -> pixel stays within a pixel for realistic sizes.
        for parent in [1.0, 7.0, 333.0, 1280.0, 1920.0, 3840.0] {
            let mut px = 0.0;
            while px <= parent {
                let pct = to_percent(px, parent).unwrap();
                let back = Length::Percent(pct).to_pixels(parent);
                assert!((back - px).abs() <= 1.0, "{px}px of {parent} came back as {back}");
                // Converting the result again must not drift.
                assert_eq!(to_percent(back, parent), Some(pct));
                px += 37.25;
            }
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!("37.5000%".parse::<Length>(), Ok(Length::Percent(37.5)));
        assert_eq!("120px".parse::<Length>(), Ok(Length::Px(120.0)));
        assert_eq!(" 64 ".parse::<Length>(), Ok(Length::Px(64.0)));
        assert!("auto".parse::<Length>().is_err());
        assert!("inf%".parse::<Length>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Length::Percent(12.0)).unwrap();
        assert_eq!(json, "\"12.0000%\"");
        let parsed: Length = serde_json::from_str("\"80px\"").unwrap();
        assert_eq!(parsed, Length::Px(80.0));
    }
}
