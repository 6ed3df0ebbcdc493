//! Admin routes for bill creation and batch CSV import.

use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    response::Response,
    routing::post,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use tracing::{error, info};

use crate::{AppState, middleware::auth::AuthUser};
use telbill_db::BillingService;
use telbill_shared::error::AppError;
use telbill_shared::types::BillingPeriod;

use super::{billing::bill_summary, failure, success};

/// Creates the admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/bill", post(create_bill))
        .route("/admin/bill-batch", post(import_bill_batch))
}

fn require_admin(user: &AuthUser) -> Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Admin role is required for this operation".to_string(),
        ))
    }
}

#[derive(Deserialize)]
struct CreateBillRequest {
    subscriber_no: String,
    month: i32,
    year: Option<i32>,
}

/// POST /admin/bill - Calculate (or recalculate) one subscriber's bill.
async fn create_bill(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateBillRequest>,
) -> Response {
    if let Err(e) = require_admin(&user) {
        return failure(&e);
    }
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
    match service.calculate_bill(&payload.subscriber_no, period).await {
        Ok(bill) => {
            info!(
                admin = %user.user_id(),
                subscriber_no = %payload.subscriber_no,
                %period,
                "bill calculated by admin"
            );
            success(
                StatusCode::CREATED,
                "Bill calculated successfully",
                bill_summary(&bill),
            )
        }
        Err(e) => failure(&e.into()),
    }
}

/// POST /admin/bill-batch - Import a CSV of billing jobs.
///
/// Expects a multipart upload with a `file` part containing rows of
/// `subscriber_no,month[,year]`. Each row is processed independently and
/// the response reports every row's outcome in file order.
async fn import_bill_batch(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Response {
    if let Err(e) = require_admin(&user) {
        return failure(&e);
    }

    let mut csv_bytes = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() == Some("file") {
                    match field.bytes().await {
                        Ok(bytes) => {
                            csv_bytes = Some(bytes);
                            break;
                        }
                        Err(e) => {
                            return failure(&AppError::Validation(format!(
                                "failed to read uploaded file: {e}"
                            )));
                        }
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                return failure(&AppError::Validation(format!("invalid multipart body: {e}")));
            }
        }
    }

    let Some(csv_bytes) = csv_bytes else {
        return failure(&AppError::Validation(
            "multipart field 'file' is required".to_string(),
        ));
    };

    let service = BillingService::new(state.db.clone(), state.schedule.clone());
    let reports = match service.import_csv(csv_bytes.as_ref(), Utc::now().year()).await {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "bill batch import failed");
            return failure(&AppError::Validation(e.to_string()));
        }
    };

    let imported = reports
        .iter()
        .filter(|r| matches!(r.outcome, telbill_core::import::RowOutcome::Imported { .. }))
        .count();
    info!(
        admin = %user.user_id(),
        rows = reports.len(),
        imported,
        "bill batch imported"
    );

    success(StatusCode::OK, "Batch import processed", reports)
}
