//! Session fee range.
//!
//! Fees are decimal amounts in euros. Either bound may be left open, but
//! when both are present the minimum must not exceed the maximum.

use rust_decimal::Decimal;
use serde::Serialize;

/// Errors produced when building a [`FeeRange`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FeeRangeError {
    #[error("fees cannot be negative")]
    Negative,
    #[error("minimum cannot exceed maximum")]
    MinAboveMax,
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

/// Minimum and maximum session fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FeeRange {
    min: Option<Decimal>,
    max: Option<Decimal>,
}

impl FeeRange {
    /// Build a validated fee range.
    ///
    /// # Errors
    ///
    /// - [`FeeRangeError::Negative`] if either bound is below zero
    /// - [`FeeRangeError::MinAboveMax`] if both are set and `min > max`
    pub fn new(min: Option<Decimal>, max: Option<Decimal>) -> Result<Self, FeeRangeError> {
        if min.is_some_and(|v| v < Decimal::ZERO) || max.is_some_and(|v| v < Decimal::ZERO) {
            return Err(FeeRangeError::Negative);
        }
        if let (Some(lo), Some(hi)) = (min, max)
            && lo > hi
        {
            return Err(FeeRangeError::MinAboveMax);
        }
        Ok(Self { min, max })
    }

    /// Parse the two form inputs; blank input leaves that bound open.
    ///
    /// # Errors
    ///
    /// Returns [`FeeRangeError::InvalidAmount`] for non-numeric input, plus
    /// everything [`FeeRange::new`] rejects.
    pub fn parse(min: &str, max: &str) -> Result<Self, FeeRangeError> {
        Self::new(parse_amount(min)?, parse_amount(max)?)
    }

    #[must_use]
    pub const fn min(&self) -> Option<Decimal> {
        self.min
    }

    #[must_use]
    pub const fn max(&self) -> Option<Decimal> {
        self.max
    }

    /// Human-readable range, e.g. `40 – 90 €`.
    #[must_use]
    pub fn display(&self) -> Option<String> {
        match (self.min, self.max) {
            (Some(lo), Some(hi)) if lo == hi => Some(format!("{} €", lo.normalize())),
            (Some(lo), Some(hi)) => Some(format!("{} – {} €", lo.normalize(), hi.normalize())),
            (Some(lo), None) => Some(format!("desde {} €", lo.normalize())),
            (None, Some(hi)) => Some(format!("hasta {} €", hi.normalize())),
            (None, None) => None,
        }
    }
}

fn parse_amount(input: &str) -> Result<Option<Decimal>, FeeRangeError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .replace(',', ".")
        .parse::<Decimal>()
        .map(Some)
        .map_err(|_| FeeRangeError::InvalidAmount(trimmed.to_owned()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_min_above_max_is_rejected() {
        let err = FeeRange::new(Some(Decimal::from(90)), Some(Decimal::from(40))).unwrap_err();
        assert_eq!(err, FeeRangeError::MinAboveMax);
        assert_eq!(err.to_string(), "minimum cannot exceed maximum");
    }

    #[test]
    fn test_open_bounds_are_allowed() {
        assert!(FeeRange::new(None, None).is_ok());
        assert!(FeeRange::new(Some(Decimal::from(60)), None).is_ok());
        assert!(FeeRange::new(None, Some(Decimal::from(60))).is_ok());
        assert!(FeeRange::new(Some(Decimal::from(60)), Some(Decimal::from(60))).is_ok());
    }

    #[test]
    fn test_negative_is_rejected() {
        assert_eq!(
            FeeRange::new(Some(Decimal::from(-1)), None),
            Err(FeeRangeError::Negative)
        );
    }

    #[test]
    fn test_parse_form_input() {
        let range = FeeRange::parse(" 45,5 ", "").unwrap();
        assert_eq!(range.min(), Some(Decimal::new(455, 1)));
        assert_eq!(range.max(), None);
        assert!(matches!(
            FeeRange::parse("cuarenta", "90"),
            Err(FeeRangeError::InvalidAmount(_))
        ));
        assert_eq!(FeeRange::parse("90", "40"), Err(FeeRangeError::MinAboveMax));
    }

    #[test]
    fn test_display() {
        let range = FeeRange::parse("40", "90").unwrap();
        assert_eq!(range.display().as_deref(), Some("40 – 90 €"));
        assert_eq!(FeeRange::default().display(), None);
    }
}
