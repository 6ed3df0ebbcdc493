//! Usage ingestion route.

use axum::{
    Json, Router, extract::State, http::StatusCode, response::Response, routing::post,
};
use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::AppState;
use telbill_db::{SubscriberRepository, UsageRepository};
use telbill_shared::error::AppError;
use telbill_shared::types::BillingPeriod;

use super::{failure, success};

/// Creates the usage ingestion routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/usage", post(record_usage))
}

#[derive(Deserialize)]
struct RecordUsageRequest {
    subscriber_no: String,
    month: i32,
    year: Option<i32>,
    #[serde(default)]
    phone_minutes: i64,
    #[serde(default)]
    internet_mb: Decimal,
}

/// POST /usage - Record one usage event for a subscriber's period.
async fn record_usage(
    State(state): State<AppState>,
    Json(payload): Json<RecordUsageRequest>,
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

    let subscribers = SubscriberRepository::new(state.db.clone());
    if let Err(e) = subscribers.ensure_exists(&payload.subscriber_no).await {
        return failure(&AppError::Database(e.to_string()));
    }

    let usage = UsageRepository::new(state.db.clone());
    match usage
        .record_usage(
            &payload.subscriber_no,
            period,
            payload.phone_minutes,
            payload.internet_mb,
        )
        .await
    {
        Ok(record) => {
            info!(
                subscriber_no = %payload.subscriber_no,
                %period,
                phone_minutes = record.phone_minutes,
                internet_mb = %record.internet_mb,
                "usage recorded"
            );
            success(
                StatusCode::CREATED,
                "Usage recorded successfully",
                json!({
                    "id": record.id,
                    "subscriber_no": record.subscriber_no,
                    "month": record.month,
                    "year": record.year,
                    "phone_minutes": record.phone_minutes,
                    "internet_mb": record.internet_mb,
                }),
            )
        }
        Err(e) => failure(&AppError::Database(e.to_string())),
    }
}
