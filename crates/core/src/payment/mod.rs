//! Payment settlement math.
//!
//! The read side of the payment path: given a bill's totals and a tendered
//! amount, decide how much applies. Persisting the outcome (payment row +
//! bill update) is the repository's job; the rules live here so they can
//! be tested without a database.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// Rejections that are expected business outcomes, not failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettlementError {
    /// The bill has no outstanding balance.
    #[error("bill is already fully paid")]
    AlreadyPaid,

    /// The tendered amount is not positive.
    #[error("payment amount must be greater than zero")]
    InvalidAmount,
}

/// Outcome of applying a payment against a bill's outstanding balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Settlement {
    /// The amount actually applied (tendered amount capped at the
    /// outstanding balance).
    pub applied_amount: Decimal,
    /// The bill's paid amount after this settlement.
    pub new_paid_amount: Decimal,
    /// Whether the bill is fully settled after this payment.
    pub is_paid: bool,
}

/// Applies `amount` against a bill with the given totals.
///
/// Overpayment is capped at the outstanding balance; the excess is
/// discarded and no credit is carried forward.
///
/// # Errors
///
/// Returns `SettlementError::AlreadyPaid` if nothing is outstanding, and
/// `SettlementError::InvalidAmount` if `amount` is not positive. Neither
/// case may produce any persisted mutation.
pub fn settle(
    total_amount: Decimal,
    paid_amount: Decimal,
    amount: Decimal,
) -> Result<Settlement, SettlementError> {
    let remaining = total_amount - paid_amount;

    if remaining <= Decimal::ZERO {
        return Err(SettlementError::AlreadyPaid);
    }

    if amount <= Decimal::ZERO {
        return Err(SettlementError::InvalidAmount);
    }

    let applied_amount = amount.min(remaining);
    let new_paid_amount = paid_amount + applied_amount;

    Ok(Settlement {
        applied_amount,
        new_paid_amount,
        is_paid: new_paid_amount >= total_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_partial_payment() {
        let s = settle(dec!(80), dec!(0), dec!(50)).unwrap();
        assert_eq!(s.applied_amount, dec!(50));
        assert_eq!(s.new_paid_amount, dec!(50));
        assert!(!s.is_paid);
    }

    #[test]
    fn test_settling_payment() {
        let s = settle(dec!(80), dec!(50), dec!(30)).unwrap();
        assert_eq!(s.applied_amount, dec!(30));
        assert_eq!(s.new_paid_amount, dec!(80));
        assert!(s.is_paid);
    }

    #[test]
    fn test_overpayment_is_capped_without_credit() {
        let s = settle(dec!(80), dec!(50), dec!(100)).unwrap();
        assert_eq!(s.applied_amount, dec!(30));
        assert_eq!(s.new_paid_amount, dec!(80));
        assert!(s.is_paid);
    }

    #[test]
    fn test_already_paid_rejected() {
        assert_eq!(
            settle(dec!(80), dec!(80), dec!(5)),
            Err(SettlementError::AlreadyPaid)
        );
    }

    #[test]
    fn test_zero_total_bill_is_already_paid() {
        // A zero-usage period produces a zero-value bill; nothing is owed.
        assert_eq!(
            settle(dec!(0), dec!(0), dec!(10)),
            Err(SettlementError::AlreadyPaid)
        );
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        assert_eq!(
            settle(dec!(80), dec!(0), dec!(0)),
            Err(SettlementError::InvalidAmount)
        );
        assert_eq!(
            settle(dec!(80), dec!(0), dec!(-5)),
            Err(SettlementError::InvalidAmount)
        );
    }

    #[test]
    fn test_conservation_over_sequence() {
        // Total 80, pay 50 then 30, then any further payment must be
        // rejected.
        let total = dec!(80);
        let mut paid = Decimal::ZERO;
        let mut applied_sum = Decimal::ZERO;

        let first = settle(total, paid, dec!(50)).unwrap();
        paid = first.new_paid_amount;
        applied_sum += first.applied_amount;
        assert!(!first.is_paid);
        assert_eq!(total - paid, dec!(30));

        let second = settle(total, paid, dec!(30)).unwrap();
        paid = second.new_paid_amount;
        applied_sum += second.applied_amount;
        assert!(second.is_paid);

        assert_eq!(paid, applied_sum);
        assert!(paid <= total);
        assert_eq!(settle(total, paid, dec!(5)), Err(SettlementError::AlreadyPaid));
    }
}
