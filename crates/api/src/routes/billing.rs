//! Bill query routes for the mobile and banking clients.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::AppState;
use telbill_db::entities::bills;
use telbill_db::{BillRepository, BillingService};
use telbill_shared::error::AppError;
use telbill_shared::types::{BillingPeriod, PageRequest};

use super::{failure, success};

/// Routes that additionally sit behind the daily query limiter.
pub fn limited_routes() -> Router<AppState> {
    Router::new().route("/bill", get(get_bill))
}

/// Creates the bill query routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bill-detailed", get(get_bill_detailed))
        .route("/bank/bills/unpaid", get(get_unpaid_bills))
}

#[derive(Deserialize)]
struct BillQuery {
    subscriber_no: Option<String>,
    month: Option<i32>,
    year: Option<i32>,
}

#[derive(Deserialize)]
struct DetailedQuery {
    subscriber_no: Option<String>,
    month: Option<i32>,
    year: Option<i32>,
    page: Option<u32>,
    per_page: Option<u32>,
}

impl DetailedQuery {
    fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

#[derive(Deserialize)]
struct UnpaidQuery {
    subscriber_no: Option<String>,
}

fn require_subscriber(subscriber_no: Option<String>) -> Result<String, AppError> {
    subscriber_no
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("subscriber_no is required".to_string()))
}

/// Builds the billing period, defaulting the year to the current one.
fn parse_period(month: Option<i32>, year: Option<i32>) -> Result<BillingPeriod, AppError> {
    let month = month.ok_or_else(|| AppError::Validation("month is required".to_string()))?;
    let year = year.unwrap_or_else(|| Utc::now().year());
    BillingPeriod::new(month, year).map_err(|e| AppError::Validation(e.to_string()))
}

fn remaining_amount(bill: &bills::Model) -> Decimal {
    bill.total_amount - bill.paid_amount
}

fn paid_status(bill: &bills::Model) -> &'static str {
    if bill.is_paid { "Paid" } else { "Unpaid" }
}

/// The compact bill view served to the mobile and banking apps.
pub(crate) fn bill_summary(bill: &bills::Model) -> Value {
    json!({
        "subscriber_no": bill.subscriber_no,
        "month": bill.month,
        "year": bill.year,
        "total_amount": bill.total_amount,
        "remaining_amount": remaining_amount(bill),
        "paid_status": paid_status(bill),
        "created_at": bill.created_at,
        "updated_at": bill.updated_at,
    })
}

/// The detailed view additionally breaks the charges down.
fn bill_detail(bill: &bills::Model) -> Value {
    json!({
        "subscriber_no": bill.subscriber_no,
        "month": bill.month,
        "year": bill.year,
        "phone_amount": bill.phone_amount,
        "internet_amount": bill.internet_amount,
        "total_amount": bill.total_amount,
        "paid_amount": bill.paid_amount,
        "remaining_amount": remaining_amount(bill),
        "paid_status": paid_status(bill),
        "created_at": bill.created_at,
        "updated_at": bill.updated_at,
    })
}

/// GET /bill - Bill summary for one subscriber and period.
///
/// Calculates the bill from usage on first sight of the period.
async fn get_bill(State(state): State<AppState>, Query(params): Query<BillQuery>) -> Response {
    let subscriber_no = match require_subscriber(params.subscriber_no) {
        Ok(s) => s,
        Err(e) => return failure(&e),
    };
    let period = match parse_period(params.month, params.year) {
        Ok(p) => p,
        Err(e) => return failure(&e),
    };

    let service = BillingService::new(state.db.clone(), state.schedule.clone());
    match service.get_or_calculate(&subscriber_no, period).await {
        Ok(bill) => success(
            StatusCode::OK,
            "Bill retrieved successfully",
            bill_summary(&bill),
        ),
        Err(e) => failure(&e.into()),
    }
}

/// GET /bill-detailed - Paginated charge breakdown for one period.
async fn get_bill_detailed(
    State(state): State<AppState>,
    Query(params): Query<DetailedQuery>,
) -> Response {
    let page_request = params.page_request();
    let subscriber_no = match require_subscriber(params.subscriber_no) {
        Ok(s) => s,
        Err(e) => return failure(&e),
    };
    let period = match parse_period(params.month, params.year) {
        Ok(p) => p,
        Err(e) => return failure(&e),
    };

    // Make sure the period has been priced before listing it.
    let service = BillingService::new(state.db.clone(), state.schedule.clone());
    if let Err(e) = service.get_or_calculate(&subscriber_no, period).await {
        return failure(&e.into());
    }

    let repo = BillRepository::new(state.db.clone());
    match repo
        .list_bills_paginated(&subscriber_no, period, page_request)
        .await
    {
        Ok(page) => {
            let data: Vec<Value> = page.data.iter().map(bill_detail).collect();
            (
                StatusCode::OK,
                Json(json!({
                    "status": "success",
                    "message": "Bill details retrieved successfully",
                    "data": data,
                    "meta": page.meta,
                })),
            )
                .into_response()
        }
        Err(e) => failure(&AppError::Database(e.to_string())),
    }
}

/// GET /bank/bills/unpaid - Outstanding bills, oldest period first.
async fn get_unpaid_bills(
    State(state): State<AppState>,
    Query(params): Query<UnpaidQuery>,
) -> Response {
    let subscriber_no = match require_subscriber(params.subscriber_no) {
        Ok(s) => s,
        Err(e) => return failure(&e),
    };

    let repo = BillRepository::new(state.db.clone());
    match repo.list_unpaid(&subscriber_no).await {
        Ok(bills) => {
            let data: Vec<Value> = bills.iter().map(bill_summary).collect();
            success(StatusCode::OK, "Unpaid bills retrieved successfully", data)
        }
        Err(e) => failure(&AppError::Database(e.to_string())),
    }
}
