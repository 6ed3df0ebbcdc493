//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use telbill_shared::error::AppError;

use crate::{
    AppState,
    middleware::{auth::auth_middleware, query_limit::query_limit_middleware},
};

pub mod admin;
pub mod auth;
pub mod billing;
pub mod health;
pub mod payments;
pub mod usage;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // The mobile bill summary additionally sits behind the daily
    // per-subscriber query allowance.
    let limited_routes = billing::limited_routes().layer(middleware::from_fn_with_state(
        state.clone(),
        query_limit_middleware,
    ));

    // Routes that require a valid bearer token.
    let protected_routes = Router::new()
        .merge(limited_routes)
        .merge(billing::routes())
        .merge(admin::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Paying a bill is open to the public web site, as are login and
    // usage ingestion from the network elements.
    Router::new()
        .merge(auth::routes())
        .merge(payments::routes())
        .merge(usage::routes())
        .merge(protected_routes)
}

/// Renders a success envelope: `{"status":"success","message",...,"data":...}`.
pub(crate) fn success<T: Serialize>(status: StatusCode, message: &str, data: T) -> Response {
    (
        status,
        Json(json!({
            "status": "success",
            "message": message,
            "data": data,
        })),
    )
        .into_response()
}

/// Renders an error envelope with the taxonomy-derived HTTP status.
pub(crate) fn failure(err: &AppError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(failure_body(err))).into_response()
}

fn failure_body(err: &AppError) -> serde_json::Value {
    json!({
        "status": "error",
        "error_code": err.error_code(),
        "message": err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_maps_error_taxonomy_to_http_status() {
        let resp = failure(&AppError::RateLimited("daily allowance used".into()));
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

        let resp = failure(&AppError::Validation("subscriber_no is required".into()));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = failure(&AppError::Unauthorized("missing bearer token".into()));
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = failure(&AppError::Conflict("payment contention".into()));
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_failure_envelope_carries_error_code() {
        let body = failure_body(&AppError::RateLimited("daily allowance used".into()));
        assert_eq!(body["status"], "error");
        assert_eq!(body["error_code"], "RATE_LIMITED");
        assert_eq!(body["message"], "Rate limited: daily allowance used");

        let body = failure_body(&AppError::Validation("subscriber_no is required".into()));
        assert_eq!(body["error_code"], "VALIDATION_ERROR");
    }
}
