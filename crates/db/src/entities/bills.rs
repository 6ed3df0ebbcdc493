//! `SeaORM` Entity for the bills table.
//!
//! One row per (subscriber_no, month, year); the triple carries a unique
//! constraint. `version` backs the optimistic-locking payment path.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "bills")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub subscriber_no: String,
    pub month: i16,
    pub year: i32,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub phone_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub internet_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub paid_amount: Decimal,
    pub is_paid: bool,
    pub version: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::subscribers::Entity",
        from = "Column::SubscriberNo",
        to = "super::subscribers::Column::SubscriberNo"
    )]
    Subscribers,
}

impl Related<super::subscribers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subscribers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
