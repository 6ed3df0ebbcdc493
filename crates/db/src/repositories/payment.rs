//! Payment recording and reconciliation.
//!
//! A payment settles against a bill through an optimistic concurrency
//! loop: the bill row carries a `version` counter, and the paid-amount
//! update only lands when the version still matches the one the
//! settlement was computed from. A lost race reloads the bill and
//! retries with the fresh balance.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use tracing::{info, warn};
use uuid::Uuid;

use telbill_core::payment::{settle, SettlementError};
use telbill_shared::types::BillingPeriod;

use crate::entities::sea_orm_active_enums::PaymentStatus;
use crate::entities::{bills, payments};

use super::billing::BillingError;

/// Retries against concurrent paid-amount updates before giving up.
const MAX_CAS_RETRIES: u32 = 3;

/// Errors from the payment path.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// The settlement rules rejected the payment.
    #[error(transparent)]
    Rejected(#[from] SettlementError),
    /// The bill could not be found or calculated.
    #[error(transparent)]
    Resolve(#[from] BillingError),
    /// The bill kept changing under us until the retry budget ran out.
    #[error("payment for {subscriber_no} {period} lost {retries} concurrent update races")]
    Contention {
        subscriber_no: String,
        period: BillingPeriod,
        retries: u32,
    },
    /// Underlying database failure.
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Outcome of a recorded payment.
#[derive(Debug, Clone)]
pub struct PaymentReceipt {
    /// The payment row that was written.
    pub payment: payments::Model,
    /// The bill as it stands after this payment was applied.
    pub bill: bills::Model,
    /// How much of the tendered amount was applied to the balance.
    pub applied_amount: Decimal,
}

/// Resolves the bill a payment should settle against.
///
/// Injected so the payment path stays decoupled from how bills come to
/// exist; the billing service implements it by looking up the stored
/// bill and calculating it from usage when absent.
#[async_trait]
pub trait BillResolver: Send + Sync {
    async fn resolve_bill(
        &self,
        subscriber_no: &str,
        period: BillingPeriod,
    ) -> Result<bills::Model, BillingError>;
}

/// Repository for payments.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: Arc<DatabaseConnection>,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Applies `amount` toward the subscriber's bill for `period`.
    ///
    /// Partial payments accumulate in `paid_amount`; the bill flips to
    /// paid once the balance reaches the total, and any excess on the
    /// final payment is capped rather than carried as credit. An
    /// already-settled bill or a non-positive amount is rejected before
    /// anything is written.
    pub async fn pay_bill(
        &self,
        resolver: &dyn BillResolver,
        subscriber_no: &str,
        period: BillingPeriod,
        amount: Decimal,
    ) -> Result<PaymentReceipt, PaymentError> {
        for attempt in 0..MAX_CAS_RETRIES {
            let bill = resolver.resolve_bill(subscriber_no, period).await?;
            let settlement = settle(bill.total_amount, bill.paid_amount, amount)?;

            let now = Utc::now().into();
            let payment = payments::ActiveModel {
                id: Set(Uuid::new_v4()),
                subscriber_no: Set(subscriber_no.to_string()),
                month: Set(i16::from(period.month)),
                year: Set(period.year),
                amount: Set(settlement.applied_amount),
                status: Set(PaymentStatus::Successful),
                created_at: Set(now),
            };

            let txn = self.db.begin().await?;

            let payment = payments::Entity::insert(payment)
                .exec_with_returning(&txn)
                .await?;

            let updated = bills::Entity::update_many()
                .filter(bills::Column::Id.eq(bill.id))
                .filter(bills::Column::Version.eq(bill.version))
                .col_expr(
                    bills::Column::PaidAmount,
                    Expr::value(settlement.new_paid_amount),
                )
                .col_expr(bills::Column::IsPaid, Expr::value(settlement.is_paid))
                .col_expr(bills::Column::Version, Expr::value(bill.version + 1))
                .col_expr(bills::Column::UpdatedAt, Expr::value(now))
                .exec(&txn)
                .await?;

            if updated.rows_affected == 0 {
                // Someone else settled against this bill first; drop the
                // payment row along with the transaction and retry on the
                // reloaded balance.
                txn.rollback().await?;
                warn!(
                    subscriber_no,
                    %period,
                    attempt,
                    "bill version moved during payment, retrying"
                );
                continue;
            }

            txn.commit().await?;

            info!(
                subscriber_no,
                %period,
                applied = %settlement.applied_amount,
                paid = %settlement.new_paid_amount,
                is_paid = settlement.is_paid,
                "payment recorded"
            );

            let bill = bills::Model {
                paid_amount: settlement.new_paid_amount,
                is_paid: settlement.is_paid,
                version: bill.version + 1,
                updated_at: now,
                ..bill
            };

            return Ok(PaymentReceipt {
                payment,
                bill,
                applied_amount: settlement.applied_amount,
            });
        }

        Err(PaymentError::Contention {
            subscriber_no: subscriber_no.to_string(),
            period,
            retries: MAX_CAS_RETRIES,
        })
    }

    /// Payments recorded for one billing period, oldest first.
    pub async fn list_for_period(
        &self,
        subscriber_no: &str,
        period: BillingPeriod,
    ) -> Result<Vec<payments::Model>, DbErr> {
        use sea_orm::QueryOrder;

        payments::Entity::find()
            .filter(payments::Column::SubscriberNo.eq(subscriber_no))
            .filter(payments::Column::Month.eq(i16::from(period.month)))
            .filter(payments::Column::Year.eq(period.year))
            .order_by_asc(payments::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};

    struct FixedResolver(bills::Model);

    #[async_trait]
    impl BillResolver for FixedResolver {
        async fn resolve_bill(
            &self,
            _subscriber_no: &str,
            _period: BillingPeriod,
        ) -> Result<bills::Model, BillingError> {
            Ok(self.0.clone())
        }
    }

    fn paid_bill() -> bills::Model {
        let now = Utc::now().into();
        bills::Model {
            id: Uuid::new_v4(),
            subscriber_no: "5551234567".to_string(),
            month: 4,
            year: 2025,
            phone_amount: dec!(20),
            internet_amount: dec!(60),
            total_amount: dec!(80),
            paid_amount: dec!(80),
            is_paid: true,
            version: 2,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_paying_settled_bill_writes_nothing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = PaymentRepository::new(Arc::new(db));
        let resolver = FixedResolver(paid_bill());
        let period = BillingPeriod::new(4, 2025).unwrap();

        let err = repo
            .pay_bill(&resolver, "5551234567", period, dec!(10))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PaymentError::Rejected(SettlementError::AlreadyPaid)
        ));
        // No transaction log entries means no statements reached the
        // database before the rejection.
        let db = Arc::into_inner(repo.db).unwrap();
        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn test_non_positive_amount_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = PaymentRepository::new(Arc::new(db));
        let mut bill = paid_bill();
        bill.paid_amount = dec!(0);
        bill.is_paid = false;
        let resolver = FixedResolver(bill);
        let period = BillingPeriod::new(4, 2025).unwrap();

        let err = repo
            .pay_bill(&resolver, "5551234567", period, dec!(0))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PaymentError::Rejected(SettlementError::InvalidAmount)
        ));
    }
}
