//! Login and token-refresh handlers. Both endpoints are public.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{LoginRequest, RefreshRequest, TokenPairResponse};
use crate::app_state::AppState;
use crate::error::{ApiError, ErrorResponse};

/// `POST /auth/login` — Exchange credentials for a token pair.
///
/// # Errors
///
/// Returns [`ApiError::Unauthenticated`] on unknown email or wrong
/// password.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    summary = "Log in",
    description = "Verifies email/password and issues an access + refresh token pair.",
    request_body = LoginRequest,
    responses(
        (status = 201, description = "Token pair issued", body = TokenPairResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let pair = state.auth.login(&req.email, &req.password).await?;
    Ok((StatusCode::CREATED, Json(TokenPairResponse::from(pair))))
}

/// `POST /auth/refresh` — Reissue a token pair from a refresh token.
///
/// # Errors
///
/// Returns [`ApiError::Unauthenticated`] if the token is invalid, is not
/// a refresh token, or the account no longer exists.
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    tag = "Auth",
    summary = "Refresh tokens",
    description = "Validates a refresh token and reissues both tokens.",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Token pair reissued", body = TokenPairResponse),
        (status = 401, description = "Invalid refresh token", body = ErrorResponse),
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let pair = state.auth.refresh(&req.refresh_token).await?;
    Ok(Json(TokenPairResponse::from(pair)))
}

/// Auth routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}
