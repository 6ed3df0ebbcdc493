//! Authentication routes for login, token refresh and logout.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::IntoResponse,
    routing::post,
};
use serde_json::json;
use tracing::{error, info};

use telbill_core::auth::verify_password;
use telbill_db::UserRepository;
use telbill_shared::auth::{LoginRequest, RefreshRequest, TokenPair};
use telbill_shared::error::AppError;

use crate::AppState;

use super::{failure, success};

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
}

fn invalid_credentials() -> axum::response::Response {
    failure(&AppError::Unauthorized("Invalid email or password".into()))
}

fn internal_error() -> axum::response::Response {
    failure(&AppError::Internal(
        "An error occurred during authentication".into(),
    ))
}

/// POST /auth/login - Authenticate an operator and return tokens.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    let user_repo = UserRepository::new(state.db.clone());

    let user = match user_repo.find_by_email(&payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            info!(email = %payload.email, "Login attempt for non-existent user");
            return invalid_credentials();
        }
        Err(e) => {
            error!(error = %e, "Database error during login");
            return internal_error();
        }
    };

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(user_id = %user.id, "Failed login attempt");
            return invalid_credentials();
        }
        Err(e) => {
            error!(error = %e, "Password verification error");
            return internal_error();
        }
    }

    let access_token = match state.jwt_service.generate_access_token(user.id, &user.role) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate access token");
            return internal_error();
        }
    };
    let refresh_token = match state.jwt_service.generate_refresh_token(user.id, &user.role) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate refresh token");
            return internal_error();
        }
    };

    info!(user_id = %user.id, role = %user.role, "User logged in");

    let tokens = TokenPair::new(
        access_token,
        refresh_token,
        state.jwt_service.access_token_expires_in(),
    );
    success(StatusCode::OK, "Login successful", tokens)
}

/// POST /auth/refresh - Exchange a refresh token for a new token pair.
async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> impl IntoResponse {
    let claims = match state.jwt_service.validate_token(&payload.refresh_token) {
        Ok(c) => c,
        Err(_) => {
            return failure(&AppError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ));
        }
    };

    // The account may have been disabled since the token was issued.
    let user_repo = UserRepository::new(state.db.clone());
    let user = match user_repo.find_by_id(claims.user_id()).await {
        Ok(Some(u)) if u.is_active => u,
        Ok(_) => {
            return failure(&AppError::Unauthorized(
                "Account is no longer active".into(),
            ));
        }
        Err(e) => {
            error!(error = %e, "Database error during token refresh");
            return internal_error();
        }
    };

    let access_token = match state.jwt_service.generate_access_token(user.id, &user.role) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate access token");
            return internal_error();
        }
    };
    let refresh_token = match state.jwt_service.generate_refresh_token(user.id, &user.role) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate refresh token");
            return internal_error();
        }
    };

    let tokens = TokenPair::new(
        access_token,
        refresh_token,
        state.jwt_service.access_token_expires_in(),
    );
    success(StatusCode::OK, "Token refreshed", tokens)
}

/// POST /auth/logout - Acknowledge a logout.
///
/// Tokens are stateless, so the server only confirms the presented token
/// was valid; the client discards its token pair.
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer ").or_else(|| h.strip_prefix("bearer ")));

    let Some(token) = token else {
        return failure(&AppError::Unauthorized(
            "Authorization header with Bearer token is required".into(),
        ));
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            info!(user_id = %claims.sub, "User logged out");
            success(StatusCode::OK, "Logout successful", json!(null))
        }
        Err(_) => failure(&AppError::Unauthorized("Invalid or malformed token".into())),
    }
}
