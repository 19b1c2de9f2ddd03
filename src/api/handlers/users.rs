//! Account sign-up handler. Public endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{ProfileResponse, SignUpRequest};
use crate::app_state::AppState;
use crate::error::{ApiError, ErrorResponse};

/// `POST /users/sign-up` — Register a new account.
///
/// # Errors
///
/// Returns [`ApiError::EmailTaken`] if the email is already registered
/// or [`ApiError::InvalidRequest`] for a malformed email.
#[utoipa::path(
    post,
    path = "/api/v1/users/sign-up",
    tag = "Users",
    summary = "Sign up",
    description = "Registers a new account with email, password, and role. The password never appears in any response.",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created", body = ProfileResponse),
        (status = 400, description = "Malformed email", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
    )
)]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state
        .users
        .sign_up(req.email, &req.password, req.role)
        .await?;
    Ok((StatusCode::CREATED, Json(ProfileResponse::from(profile))))
}

/// User routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/users/sign-up", post(sign_up))
}
