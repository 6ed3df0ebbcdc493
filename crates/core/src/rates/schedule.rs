//! Rate schedule configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use telbill_shared::config::BillingConfig;

/// Megabytes in one gigabyte.
const MB_PER_GB: i64 = 1024;

/// Immutable rate card used by the calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSchedule {
    /// Free phone minutes per billing period.
    pub free_phone_minutes: i64,
    /// Size of one billable phone block, in minutes.
    pub phone_block_minutes: i64,
    /// Charge per started phone block.
    pub phone_block_rate: Decimal,
    /// Flat internet base charge for any non-zero usage.
    pub internet_base_charge: Decimal,
    /// GB covered by the base charge.
    pub internet_base_allowance_gb: Decimal,
    /// Size of one billable internet block, in GB.
    pub internet_block_gb: Decimal,
    /// Charge per started internet block.
    pub internet_block_rate: Decimal,
}

impl RateSchedule {
    /// Converts megabytes to gigabytes (1 GB = 1024 MB).
    #[must_use]
    pub fn mb_to_gb(megabytes: Decimal) -> Decimal {
        megabytes / Decimal::from(MB_PER_GB)
    }
}

impl Default for RateSchedule {
    fn default() -> Self {
        Self::from(&BillingConfig::default())
    }
}

impl From<&BillingConfig> for RateSchedule {
    fn from(config: &BillingConfig) -> Self {
        Self {
            free_phone_minutes: config.free_phone_minutes,
            phone_block_minutes: config.phone_block_minutes,
            phone_block_rate: config.phone_block_rate,
            internet_base_charge: config.internet_base_charge,
            internet_base_allowance_gb: config.internet_base_allowance_gb,
            internet_block_gb: config.internet_block_gb,
            internet_block_rate: config.internet_block_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_schedule_matches_rate_card() {
        let schedule = RateSchedule::default();
        assert_eq!(schedule.free_phone_minutes, 1000);
        assert_eq!(schedule.phone_block_rate, dec!(10));
        assert_eq!(schedule.internet_base_charge, dec!(50));
        assert_eq!(schedule.internet_base_allowance_gb, dec!(20));
    }

    #[test]
    fn test_mb_to_gb() {
        assert_eq!(RateSchedule::mb_to_gb(dec!(1024)), dec!(1));
        assert_eq!(RateSchedule::mb_to_gb(dec!(25600)), dec!(25));
        assert_eq!(RateSchedule::mb_to_gb(dec!(512)), dec!(0.5));
    }
}
