//! `SeaORM` active enums mapped to Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Status of a committed payment event.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_status")]
#[serde(rename_all = "PascalCase")]
pub enum PaymentStatus {
    /// The payment was applied to a bill.
    #[sea_orm(string_value = "successful")]
    Successful,
    /// The payment could not be applied.
    #[sea_orm(string_value = "failed")]
    Failed,
}
