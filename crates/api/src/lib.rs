//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for the mobile, banking, and admin clients
//! - Authentication middleware
//! - The per-subscriber daily query limiter
//! - Response envelope types

pub mod middleware;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use telbill_core::rates::RateSchedule;
use telbill_shared::jwt::JwtService;

use crate::middleware::query_limit::QueryLimiter;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Rate schedule bills are priced against.
    pub schedule: RateSchedule,
    /// Per-subscriber daily query limiter for the mobile bill endpoint.
    pub query_limiter: Arc<QueryLimiter>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .merge(routes::health::routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
