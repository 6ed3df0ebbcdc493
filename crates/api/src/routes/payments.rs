//! Payment routes for the public web site.

use axum::{
    Json, Router, extract::State, http::StatusCode, response::Response, routing::post,
};
use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::AppState;
use telbill_db::repositories::{BillingService, PaymentRepository};
use telbill_shared::error::AppError;
use telbill_shared::types::BillingPeriod;

use super::{failure, success};

/// Creates the payment routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/pay-bill", post(pay_bill))
}

#[derive(Deserialize)]
struct PayBillRequest {
    subscriber_no: String,
    month: i32,
    year: Option<i32>,
    amount: Decimal,
}

/// POST /pay-bill - Apply a payment toward one period's bill.
///
/// Partial payments are accepted and accumulate; the response message
/// says whether the bill is now settled or a remainder was saved.
async fn pay_bill(
    State(state): State<AppState>,
    Json(payload): Json<PayBillRequest>,
) -> Response {
    if payload.subscriber_no.is_empty() {
        return failure(&AppError::Validation(
            "subscriber_no is required".to_string(),
        ));
    }

    let year = payload.year.unwrap_or_else(|| Utc::now().year());
    let period = match BillingPeriod::new(payload.month, year) {
        Ok(p) => p,
        Err(e) => return failure(&AppError::Validation(e.to_string())),
    };

    let service = BillingService::new(state.db.clone(), state.schedule.clone());
    let payments = PaymentRepository::new(state.db.clone());

    let receipt = match payments
        .pay_bill(&service, &payload.subscriber_no, period, payload.amount)
        .await
    {
        Ok(r) => r,
        Err(e) => return failure(&e.into()),
    };

    let remaining = receipt.bill.total_amount - receipt.bill.paid_amount;
    let message = if receipt.bill.is_paid {
        "Bill paid successfully"
    } else {
        "Partial payment recorded, remaining amount is saved"
    };

    info!(
        subscriber_no = %payload.subscriber_no,
        %period,
        applied = %receipt.applied_amount,
        remaining = %remaining,
        "payment accepted"
    );

    success(
        StatusCode::OK,
        message,
        json!({
            "payment_id": receipt.payment.id,
            "subscriber_no": receipt.bill.subscriber_no,
            "month": receipt.bill.month,
            "year": receipt.bill.year,
            "applied_amount": receipt.applied_amount,
            "paid_amount": receipt.bill.paid_amount,
            "remaining_amount": remaining,
            "paid_status": if receipt.bill.is_paid { "Paid" } else { "Unpaid" },
        }),
    )
}
