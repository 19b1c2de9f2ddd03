//! School page handlers: creation and the subscription lifecycle.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};

use crate::api::AuthUser;
use crate::api::dto::{CreateSchoolRequest, ProfileResponse, SchoolResponse};
use crate::app_state::AppState;
use crate::domain::Role;
use crate::error::{ApiError, ErrorResponse};

/// `POST /schools` — Create a school page.
///
/// # Errors
///
/// Returns [`ApiError::PermissionDenied`] below admin level or
/// [`ApiError::RegionNotFound`] for an unknown region.
#[utoipa::path(
    post,
    path = "/api/v1/schools",
    tag = "Schools",
    summary = "Create a school page",
    description = "Creates a page for a school in a known region. The creator becomes its first admin.",
    request_body = CreateSchoolRequest,
    responses(
        (status = 201, description = "Page created", body = SchoolResponse),
        (status = 401, description = "Missing or invalid credential", body = ErrorResponse),
        (status = 403, description = "Role level below admin", body = ErrorResponse),
        (status = 404, description = "Region does not exist", body = ErrorResponse),
    )
)]
pub async fn create_school(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(req): Json<CreateSchoolRequest>,
) -> Result<impl IntoResponse, ApiError> {
    caller.require_role(Role::Admin)?;
    let school = state
        .schools
        .create_page(caller.id, req.name, req.region_name)
        .await?;
    Ok((StatusCode::CREATED, Json(SchoolResponse::from(school))))
}

/// `GET /schools/subscriptions` — School pages the caller subscribes to.
///
/// # Errors
///
/// Returns [`ApiError::Unauthenticated`] without a valid credential.
#[utoipa::path(
    get,
    path = "/api/v1/schools/subscriptions",
    tag = "Schools",
    summary = "List subscribed school pages",
    responses(
        (status = 200, description = "Subscribed pages", body = Vec<SchoolResponse>),
        (status = 401, description = "Missing or invalid credential", body = ErrorResponse),
    )
)]
pub async fn list_subscriptions(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    caller.require_role(Role::Student)?;
    let pages = state
        .subscriptions
        .subscribed_pages(caller.id, &caller.email)
        .await?;
    let body: Vec<SchoolResponse> = pages.into_iter().map(SchoolResponse::from).collect();
    Ok(Json(body))
}

/// `PATCH /schools/:school_id/subscribe` — Subscribe to a school page.
///
/// # Errors
///
/// Returns [`ApiError::SchoolNotFound`] or
/// [`ApiError::AlreadySubscribed`].
#[utoipa::path(
    patch,
    path = "/api/v1/schools/{school_id}/subscribe",
    tag = "Schools",
    summary = "Subscribe to a school page",
    params(
        ("school_id" = uuid::Uuid, Path, description = "School page UUID"),
    ),
    responses(
        (status = 201, description = "Subscription added", body = ProfileResponse),
        (status = 404, description = "School not found", body = ErrorResponse),
        (status = 409, description = "Already subscribed", body = ErrorResponse),
    )
)]
pub async fn subscribe(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(school_id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    caller.require_role(Role::Student)?;
    let profile = state
        .subscriptions
        .subscribe(caller.id, &caller.email, school_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ProfileResponse::from(profile))))
}

/// `PATCH /schools/:school_id/unsubscribe` — Unsubscribe from a school
/// page, archiving the window's feeds.
///
/// # Errors
///
/// Returns [`ApiError::SchoolNotFound`], [`ApiError::NotSubscribed`], or
/// a server error if the snapshot transaction aborts.
#[utoipa::path(
    patch,
    path = "/api/v1/schools/{school_id}/unsubscribe",
    tag = "Schools",
    summary = "Unsubscribe from a school page",
    description = "Snapshots the feeds posted during the subscription window, then removes the subscription. Both writes commit atomically.",
    params(
        ("school_id" = uuid::Uuid, Path, description = "School page UUID"),
    ),
    responses(
        (status = 201, description = "Subscription removed", body = ProfileResponse),
        (status = 404, description = "School not found", body = ErrorResponse),
        (status = 409, description = "Not currently subscribed", body = ErrorResponse),
        (status = 500, description = "Snapshot transaction aborted", body = ErrorResponse),
    )
)]
pub async fn unsubscribe(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(school_id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    caller.require_role(Role::Student)?;
    let profile = state
        .subscriptions
        .unsubscribe(caller.id, &caller.email, school_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ProfileResponse::from(profile))))
}

/// School routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/schools", post(create_school))
        .route("/schools/subscriptions", get(list_subscriptions))
        .route("/schools/{school_id}/subscribe", patch(subscribe))
        .route("/schools/{school_id}/unsubscribe", patch(unsubscribe))
}
