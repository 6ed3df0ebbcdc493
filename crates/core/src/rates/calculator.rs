//! Usage-to-charge calculation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::schedule::RateSchedule;

/// Result of a rate calculation for one billing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeBreakdown {
    /// Charge for phone usage.
    pub phone_amount: Decimal,
    /// Charge for internet usage.
    pub internet_amount: Decimal,
    /// Total charge (phone + internet).
    pub total_amount: Decimal,
}

impl ChargeBreakdown {
    /// A zero-value breakdown (no usage on either axis).
    #[must_use]
    pub fn zero() -> Self {
        Self {
            phone_amount: Decimal::ZERO,
            internet_amount: Decimal::ZERO,
            total_amount: Decimal::ZERO,
        }
    }
}

/// Pure, deterministic rate calculator over a [`RateSchedule`].
#[derive(Debug, Clone)]
pub struct RateCalculator {
    schedule: RateSchedule,
}

impl RateCalculator {
    /// Creates a calculator over the given schedule.
    #[must_use]
    pub const fn new(schedule: RateSchedule) -> Self {
        Self { schedule }
    }

    /// Returns the schedule this calculator prices against.
    #[must_use]
    pub const fn schedule(&self) -> &RateSchedule {
        &self.schedule
    }

    /// Calculates the charge breakdown for one period's usage.
    ///
    /// Partial blocks always round UP to the next whole billing block;
    /// under-billing partial usage is not allowed. Negative inputs are
    /// clamped to zero.
    #[must_use]
    pub fn calculate(&self, phone_minutes: i64, internet_mb: Decimal) -> ChargeBreakdown {
        let phone_amount = self.phone_charge(phone_minutes.max(0));
        let internet_amount = self.internet_charge(internet_mb.max(Decimal::ZERO));

        ChargeBreakdown {
            phone_amount,
            internet_amount,
            total_amount: phone_amount + internet_amount,
        }
    }

    /// Phone tier: the first `free_phone_minutes` are free; every started
    /// block beyond that is charged at `phone_block_rate`.
    fn phone_charge(&self, minutes: i64) -> Decimal {
        let over = minutes - self.schedule.free_phone_minutes;
        if over <= 0 {
            return Decimal::ZERO;
        }

        let blocks = (Decimal::from(over) / Decimal::from(self.schedule.phone_block_minutes))
            .ceil();
        blocks * self.schedule.phone_block_rate
    }

    /// Internet tier: any non-zero usage pays the flat base charge, which
    /// covers up to `internet_base_allowance_gb`; every started block
    /// beyond the allowance is charged at `internet_block_rate`.
    fn internet_charge(&self, megabytes: Decimal) -> Decimal {
        let gigabytes = RateSchedule::mb_to_gb(megabytes);
        if gigabytes <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let mut amount = self.schedule.internet_base_charge;

        let over = gigabytes - self.schedule.internet_base_allowance_gb;
        if over > Decimal::ZERO {
            let blocks = (over / self.schedule.internet_block_gb).ceil();
            amount += blocks * self.schedule.internet_block_rate;
        }

        amount
    }
}

impl Default for RateCalculator {
    fn default() -> Self {
        Self::new(RateSchedule::default())
    }
}
