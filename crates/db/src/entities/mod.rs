//! `SeaORM` entity definitions.

pub mod bills;
pub mod payments;
pub mod sea_orm_active_enums;
pub mod subscribers;
pub mod usage_records;
pub mod users;
