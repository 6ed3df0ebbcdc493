//! Bill ledger repository.
//!
//! Owns bill records keyed by (subscriber_no, month, year). The payment
//! path mutates `paid_amount`/`is_paid` through [`super::payment`], never
//! directly.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, Insert, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use telbill_core::rates::ChargeBreakdown;
use telbill_shared::types::{BillingPeriod, PageRequest, PageResponse};

use crate::entities::bills;

/// Repository for bill records.
#[derive(Debug, Clone)]
pub struct BillRepository {
    db: Arc<DatabaseConnection>,
}

impl BillRepository {
    /// Creates a new bill repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Builds the charge-upsert statement for one billing period.
    ///
    /// Keyed on the (subscriber_no, month, year) unique constraint, so
    /// concurrent first-time calculation cannot create duplicate rows.
    /// Recalculation rewrites only `phone_amount`, `internet_amount`,
    /// `total_amount`, and `updated_at`; `paid_amount` and `is_paid`
    /// survive so recomputation never erases payment history.
    fn charge_upsert(
        subscriber_no: &str,
        period: BillingPeriod,
        charges: &ChargeBreakdown,
    ) -> Insert<bills::ActiveModel> {
        let now = Utc::now().into();

        let bill = bills::ActiveModel {
            id: Set(Uuid::new_v4()),
            subscriber_no: Set(subscriber_no.to_string()),
            month: Set(i16::from(period.month)),
            year: Set(period.year),
            phone_amount: Set(charges.phone_amount),
            internet_amount: Set(charges.internet_amount),
            total_amount: Set(charges.total_amount),
            paid_amount: Set(rust_decimal::Decimal::ZERO),
            is_paid: Set(false),
            version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };

        bills::Entity::insert(bill).on_conflict(
            OnConflict::columns([
                bills::Column::SubscriberNo,
                bills::Column::Month,
                bills::Column::Year,
            ])
            .update_columns([
                bills::Column::PhoneAmount,
                bills::Column::InternetAmount,
                bills::Column::TotalAmount,
                bills::Column::UpdatedAt,
            ])
            .to_owned(),
        )
    }

    /// Upserts the charge fields of a bill for one billing period.
    pub async fn upsert_charges(
        &self,
        subscriber_no: &str,
        period: BillingPeriod,
        charges: &ChargeBreakdown,
    ) -> Result<bills::Model, DbErr> {
        Self::charge_upsert(subscriber_no, period, charges)
            .exec_with_returning(self.db.as_ref())
            .await
    }

    /// Point lookup by billing period key.
    pub async fn find_bill(
        &self,
        subscriber_no: &str,
        period: BillingPeriod,
    ) -> Result<Option<bills::Model>, DbErr> {
        bills::Entity::find()
            .filter(bills::Column::SubscriberNo.eq(subscriber_no))
            .filter(bills::Column::Month.eq(i16::from(period.month)))
            .filter(bills::Column::Year.eq(period.year))
            .one(self.db.as_ref())
            .await
    }

    /// Paginated listing for the detailed multi-client query view.
    ///
    /// The page request is clamped to page >= 1 and page size 1..=100.
    pub async fn list_bills_paginated(
        &self,
        subscriber_no: &str,
        period: BillingPeriod,
        page: PageRequest,
    ) -> Result<PageResponse<bills::Model>, DbErr> {
        let page = page.clamped();

        let paginator = bills::Entity::find()
            .filter(bills::Column::SubscriberNo.eq(subscriber_no))
            .filter(bills::Column::Month.eq(i16::from(period.month)))
            .filter(bills::Column::Year.eq(period.year))
            .order_by_asc(bills::Column::CreatedAt)
            .paginate(self.db.as_ref(), page.limit());

        let total = paginator.num_items().await?;
        let data = paginator.fetch_page(u64::from(page.page - 1)).await?;

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Unpaid bills for a subscriber, oldest billing period first
    /// (year ascending, then month ascending) for collections workflows.
    pub async fn list_unpaid(&self, subscriber_no: &str) -> Result<Vec<bills::Model>, DbErr> {
        bills::Entity::find()
            .filter(bills::Column::SubscriberNo.eq(subscriber_no))
            .filter(bills::Column::IsPaid.eq(false))
            .order_by_asc(bills::Column::Year)
            .order_by_asc(bills::Column::Month)
            .all(self.db.as_ref())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase, QueryTrait};

    pub(crate) fn bill(month: i16, year: i32, is_paid: bool) -> bills::Model {
        let now = Utc::now().into();
        bills::Model {
            id: Uuid::new_v4(),
            subscriber_no: "5551234567".to_string(),
            month,
            year,
            phone_amount: dec!(20),
            internet_amount: dec!(60),
            total_amount: dec!(80),
            paid_amount: dec!(0),
            is_paid,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_recalculation_rewrites_only_charge_columns() {
        let period = BillingPeriod::new(4, 2025).unwrap();
        let charges = ChargeBreakdown {
            phone_amount: dec!(20),
            internet_amount: dec!(60),
            total_amount: dec!(80),
        };

        let sql = BillRepository::charge_upsert("5551234567", period, &charges)
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#"ON CONFLICT ("subscriber_no", "month", "year") DO UPDATE"#));
        for column in ["phone_amount", "internet_amount", "total_amount", "updated_at"] {
            assert!(
                sql.contains(&format!(r#""{column}" = "excluded"."{column}""#)),
                "missing charge column {column} in: {sql}"
            );
        }
        // A recalculated bill keeps its payment state, so the conflict
        // update must never touch these.
        for column in ["paid_amount", "is_paid", "version", "created_at"] {
            assert!(
                !sql.contains(&format!(r#""{column}" = "excluded""#)),
                "payment column {column} must not be rewritten: {sql}"
            );
        }
    }

    #[tokio::test]
    async fn test_find_bill_returns_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![bill(4, 2025, false)]])
            .into_connection();

        let repo = BillRepository::new(Arc::new(db));
        let period = BillingPeriod::new(4, 2025).unwrap();
        let found = repo.find_bill("5551234567", period).await.unwrap();

        assert_eq!(found.unwrap().total_amount, dec!(80));
    }

    #[tokio::test]
    async fn test_find_bill_returns_none_when_absent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<bills::Model>::new()])
            .into_connection();

        let repo = BillRepository::new(Arc::new(db));
        let period = BillingPeriod::new(4, 2025).unwrap();
        assert!(repo.find_bill("5551234567", period).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_unpaid_passes_rows_through_in_order() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![bill(11, 2024, false), bill(1, 2025, false)]])
            .into_connection();

        let repo = BillRepository::new(Arc::new(db));
        let unpaid = repo.list_unpaid("5551234567").await.unwrap();

        assert_eq!(unpaid.len(), 2);
        assert_eq!((unpaid[0].year, unpaid[0].month), (2024, 11));
        assert_eq!((unpaid[1].year, unpaid[1].month), (2025, 1));
    }
}
