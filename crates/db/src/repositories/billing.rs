//! Billing orchestration across subscribers, usage, and bills.
//!
//! Ties the pure rate calculator to the repositories: usage in, charges
//! out, bill row upserted. Also drives the batch CSV import, where each
//! row succeeds or fails on its own.

use std::io::Read;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr};
use tracing::info;

use telbill_core::import::{parse_csv, ImportError, RowOutcome, RowReport};
use telbill_core::rates::{RateCalculator, RateSchedule};
use telbill_shared::error::AppError;
use telbill_shared::types::BillingPeriod;

use crate::entities::bills;
use crate::repositories::{
    BillRepository, BillResolver, PaymentError, SubscriberRepository, UsageError, UsageRepository,
};

/// Errors from bill calculation.
#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    /// No usage exists to price for the requested period.
    #[error(transparent)]
    Usage(#[from] UsageError),
    /// Underlying database failure.
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Coordinates bill calculation over the repository layer.
#[derive(Debug, Clone)]
pub struct BillingService {
    subscribers: SubscriberRepository,
    usage: UsageRepository,
    bills: BillRepository,
    calculator: RateCalculator,
}

impl BillingService {
    /// Creates a billing service over one connection pool.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, schedule: RateSchedule) -> Self {
        Self {
            subscribers: SubscriberRepository::new(db.clone()),
            usage: UsageRepository::new(db.clone()),
            bills: BillRepository::new(db),
            calculator: RateCalculator::new(schedule),
        }
    }

    /// Prices the subscriber's usage for `period` and upserts the bill.
    ///
    /// Running this again after more usage arrives rewrites the charge
    /// columns in place; payments already made against the bill are left
    /// untouched. The same period key always lands on the same row, so
    /// repeated calculation is idempotent.
    pub async fn calculate_bill(
        &self,
        subscriber_no: &str,
        period: BillingPeriod,
    ) -> Result<bills::Model, BillingError> {
        self.subscribers.ensure_exists(subscriber_no).await?;

        let usage = self.usage.monthly_usage(subscriber_no, period).await?;
        let charges = self
            .calculator
            .calculate(usage.phone_minutes, usage.internet_mb);

        let bill = self
            .bills
            .upsert_charges(subscriber_no, period, &charges)
            .await?;

        info!(
            subscriber_no,
            %period,
            phone = %charges.phone_amount,
            internet = %charges.internet_amount,
            total = %charges.total_amount,
            "bill calculated"
        );

        Ok(bill)
    }

    /// Returns the stored bill, calculating it from usage when absent.
    pub async fn get_or_calculate(
        &self,
        subscriber_no: &str,
        period: BillingPeriod,
    ) -> Result<bills::Model, BillingError> {
        if let Some(bill) = self.bills.find_bill(subscriber_no, period).await? {
            return Ok(bill);
        }
        self.calculate_bill(subscriber_no, period).await
    }

    /// Runs a CSV of (subscriber_no, month[, year]) jobs through bill
    /// calculation, one row at a time.
    ///
    /// Reports come back in file order, one per data row. A row that
    /// fails parsing or pricing is reported and skipped without
    /// disturbing its neighbours; only an unreadable stream aborts the
    /// whole batch.
    pub async fn import_csv<R: Read>(
        &self,
        reader: R,
        default_year: i32,
    ) -> Result<Vec<RowReport>, ImportError> {
        let rows = parse_csv(reader, default_year)?;
        let mut reports = Vec::with_capacity(rows.len());

        for row in rows {
            let outcome = match row.job {
                Ok(job) => match self.calculate_bill(&job.subscriber_no, job.period).await {
                    Ok(bill) => RowOutcome::Imported { bill_id: bill.id },
                    Err(err) => RowOutcome::Failed {
                        message: err.to_string(),
                    },
                },
                Err(message) => RowOutcome::Failed { message },
            };
            reports.push(RowReport {
                line: row.line,
                echo: row.echo,
                outcome,
            });
        }

        Ok(reports)
    }
}

#[async_trait]
impl BillResolver for BillingService {
    async fn resolve_bill(
        &self,
        subscriber_no: &str,
        period: BillingPeriod,
    ) -> Result<bills::Model, BillingError> {
        self.get_or_calculate(subscriber_no, period).await
    }
}

impl From<UsageError> for AppError {
    fn from(err: UsageError) -> Self {
        match err {
            UsageError::Unavailable { .. } => Self::NotFound(err.to_string()),
            UsageError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

impl From<BillingError> for AppError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::Usage(e) => e.into(),
            BillingError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Rejected(e) => Self::BusinessRule(e.to_string()),
            PaymentError::Resolve(e) => e.into(),
            PaymentError::Contention { .. } => Self::Conflict(err.to_string()),
            PaymentError::Database(e) => Self::Database(e.to_string()),
        }
    }
}
