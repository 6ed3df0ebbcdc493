//! Usage aggregation repository.
//!
//! The read side is the Usage Aggregator the rate calculation depends on;
//! the write side backs the usage ingestion endpoint.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use telbill_shared::types::BillingPeriod;

use crate::entities::usage_records;

/// Error types for usage operations.
#[derive(Debug, thiserror::Error)]
pub enum UsageError {
    /// No usage rows exist for the subscriber in the requested period.
    #[error("no usage data for subscriber {subscriber_no} in {period}")]
    Unavailable {
        /// Subscriber number.
        subscriber_no: String,
        /// Requested billing period.
        period: BillingPeriod,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Aggregated usage for one subscriber and billing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyUsage {
    /// Total phone minutes consumed.
    pub phone_minutes: i64,
    /// Total internet megabytes consumed.
    pub internet_mb: Decimal,
}

/// Repository for usage records.
#[derive(Debug, Clone)]
pub struct UsageRepository {
    db: Arc<DatabaseConnection>,
}

impl UsageRepository {
    /// Creates a new usage repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Records one usage event for a subscriber's billing period.
    pub async fn record_usage(
        &self,
        subscriber_no: &str,
        period: BillingPeriod,
        phone_minutes: i64,
        internet_mb: Decimal,
    ) -> Result<usage_records::Model, DbErr> {
        let record = usage_records::ActiveModel {
            id: Set(Uuid::new_v4()),
            subscriber_no: Set(subscriber_no.to_string()),
            month: Set(i16::from(period.month)),
            year: Set(period.year),
            phone_minutes: Set(phone_minutes.max(0)),
            internet_mb: Set(internet_mb.max(Decimal::ZERO)),
            created_at: Set(Utc::now().into()),
        };

        record.insert(self.db.as_ref()).await
    }

    /// Sums usage for a subscriber over one billing period.
    ///
    /// # Errors
    ///
    /// Returns `UsageError::Unavailable` if no usage rows exist for the
    /// period at all. A period with rows that sum to zero is valid zero
    /// usage, not an error.
    pub async fn monthly_usage(
        &self,
        subscriber_no: &str,
        period: BillingPeriod,
    ) -> Result<MonthlyUsage, UsageError> {
        let records = usage_records::Entity::find()
            .filter(usage_records::Column::SubscriberNo.eq(subscriber_no))
            .filter(usage_records::Column::Month.eq(i16::from(period.month)))
            .filter(usage_records::Column::Year.eq(period.year))
            .all(self.db.as_ref())
            .await?;

        if records.is_empty() {
            return Err(UsageError::Unavailable {
                subscriber_no: subscriber_no.to_string(),
                period,
            });
        }

        let usage = records.iter().fold(
            MonthlyUsage {
                phone_minutes: 0,
                internet_mb: Decimal::ZERO,
            },
            |acc, record| MonthlyUsage {
                phone_minutes: acc.phone_minutes + record.phone_minutes,
                internet_mb: acc.internet_mb + record.internet_mb,
            },
        );

        Ok(usage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn record(minutes: i64, mb: Decimal) -> usage_records::Model {
        usage_records::Model {
            id: Uuid::new_v4(),
            subscriber_no: "5551234567".to_string(),
            month: 4,
            year: 2025,
            phone_minutes: minutes,
            internet_mb: mb,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_monthly_usage_sums_records() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                record(1500, dec!(10240)),
                record(1000, dec!(15360)),
            ]])
            .into_connection();

        let repo = UsageRepository::new(Arc::new(db));
        let period = BillingPeriod::new(4, 2025).unwrap();
        let usage = repo.monthly_usage("5551234567", period).await.unwrap();

        assert_eq!(usage.phone_minutes, 2500);
        assert_eq!(usage.internet_mb, dec!(25600));
    }

    #[tokio::test]
    async fn test_monthly_usage_unavailable_when_no_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<usage_records::Model>::new()])
            .into_connection();

        let repo = UsageRepository::new(Arc::new(db));
        let period = BillingPeriod::new(4, 2025).unwrap();
        let result = repo.monthly_usage("5551234567", period).await;

        assert!(matches!(result, Err(UsageError::Unavailable { .. })));
    }
}
