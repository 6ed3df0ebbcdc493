//! Tiered rate calculation for phone and internet usage.
//!
//! The rate card is an explicit, immutable [`RateSchedule`] so pricing can
//! be versioned in configuration and in tests instead of living in
//! hardcoded literals.

pub mod calculator;
pub mod schedule;

#[cfg(test)]
mod props;

pub use calculator::{ChargeBreakdown, RateCalculator};
pub use schedule::RateSchedule;
