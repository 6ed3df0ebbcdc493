//! Billing period identification.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors building a billing period.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    /// Month outside 1..=12.
    #[error("month must be between 1 and 12, got {0}")]
    InvalidMonth(i32),
}

/// One billing period: a calendar month of a given year.
///
/// Together with a subscriber number this identifies exactly one bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BillingPeriod {
    /// Month (1-12).
    pub month: u8,
    /// Calendar year.
    pub year: i32,
}

impl BillingPeriod {
    /// Creates a billing period, validating the month range.
    ///
    /// # Errors
    ///
    /// Returns `PeriodError::InvalidMonth` if `month` is outside 1..=12.
    pub fn new(month: i32, year: i32) -> Result<Self, PeriodError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodError::InvalidMonth(month));
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(Self {
            month: month as u8,
            year,
        })
    }
}

impl std::fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1)]
    #[case(6)]
    #[case(12)]
    fn test_valid_months(#[case] month: i32) {
        assert!(BillingPeriod::new(month, 2025).is_ok());
    }

    #[rstest]
    #[case(0)]
    #[case(13)]
    #[case(-1)]
    fn test_invalid_months(#[case] month: i32) {
        assert_eq!(
            BillingPeriod::new(month, 2025),
            Err(PeriodError::InvalidMonth(month))
        );
    }

    #[test]
    fn test_display() {
        let period = BillingPeriod::new(4, 2025).unwrap();
        assert_eq!(period.to_string(), "2025-04");
    }
}
