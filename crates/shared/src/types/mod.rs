//! Common types used across the application.

pub mod pagination;
pub mod period;

pub use pagination::{PageRequest, PageResponse};
pub use period::{BillingPeriod, PeriodError};
