//! Property-based tests for the rate calculator.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::calculator::RateCalculator;

/// Strategy for plausible phone usage in minutes.
fn phone_minutes() -> impl Strategy<Value = i64> {
    0i64..1_000_000
}

/// Strategy for plausible internet usage in whole megabytes.
fn internet_mb() -> impl Strategy<Value = i64> {
    0i64..10_000_000
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Total always equals phone + internet.
    #[test]
    fn prop_total_is_sum_of_parts(minutes in phone_minutes(), mb in internet_mb()) {
        let charges = RateCalculator::default().calculate(minutes, Decimal::from(mb));
        prop_assert_eq!(
            charges.total_amount,
            charges.phone_amount + charges.internet_amount
        );
    }

    /// Charges are never negative.
    #[test]
    fn prop_charges_non_negative(minutes in -10_000i64..1_000_000, mb in -10_000i64..10_000_000) {
        let charges = RateCalculator::default().calculate(minutes, Decimal::from(mb));
        prop_assert!(charges.phone_amount >= Decimal::ZERO);
        prop_assert!(charges.internet_amount >= Decimal::ZERO);
        prop_assert!(charges.total_amount >= Decimal::ZERO);
    }

    /// Usage within the free phone tier is never charged.
    #[test]
    fn prop_free_phone_tier(minutes in 0i64..=1000) {
        let charges = RateCalculator::default().calculate(minutes, Decimal::ZERO);
        prop_assert_eq!(charges.phone_amount, Decimal::ZERO);
    }

    /// More usage never costs less (monotonicity on each axis).
    #[test]
    fn prop_monotone_in_usage(
        minutes in phone_minutes(),
        extra_minutes in 0i64..100_000,
        mb in internet_mb(),
        extra_mb in 0i64..1_000_000,
    ) {
        let calc = RateCalculator::default();
        let base = calc.calculate(minutes, Decimal::from(mb));
        let more = calc.calculate(minutes + extra_minutes, Decimal::from(mb + extra_mb));
        prop_assert!(more.phone_amount >= base.phone_amount);
        prop_assert!(more.internet_amount >= base.internet_amount);
        prop_assert!(more.total_amount >= base.total_amount);
    }

    /// Calculation is idempotent: recomputing identical usage yields the
    /// same breakdown.
    #[test]
    fn prop_idempotent(minutes in phone_minutes(), mb in internet_mb()) {
        let calc = RateCalculator::default();
        let first = calc.calculate(minutes, Decimal::from(mb));
        let second = calc.calculate(minutes, Decimal::from(mb));
        prop_assert_eq!(first, second);
    }
}
