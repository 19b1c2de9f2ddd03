//! Feed handlers: per-school CRUD and the aggregated user feed.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::AuthUser;
use crate::api::dto::{CreateFeedRequest, FeedResponse, UpdateFeedRequest};
use crate::app_state::AppState;
use crate::domain::Role;
use crate::error::{ApiError, ErrorResponse};

/// `POST /schools/:school_id/feeds` — Post a feed item.
///
/// # Errors
///
/// Returns [`ApiError::PermissionDenied`] if the caller is below admin
/// level or not an admin of this page, or [`ApiError::SchoolNotFound`].
#[utoipa::path(
    post,
    path = "/api/v1/schools/{school_id}/feeds",
    tag = "Feeds",
    summary = "Post a feed item",
    params(
        ("school_id" = uuid::Uuid, Path, description = "School page UUID"),
    ),
    request_body = CreateFeedRequest,
    responses(
        (status = 201, description = "Feed posted", body = FeedResponse),
        (status = 403, description = "Not an admin of this page", body = ErrorResponse),
        (status = 404, description = "School not found", body = ErrorResponse),
    )
)]
pub async fn create_feed(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(school_id): Path<uuid::Uuid>,
    Json(req): Json<CreateFeedRequest>,
) -> Result<impl IntoResponse, ApiError> {
    caller.require_role(Role::Admin)?;
    let feed = state
        .feeds
        .create(caller.id, school_id, req.subject, req.content)
        .await?;
    Ok((StatusCode::CREATED, Json(FeedResponse::from(feed))))
}

/// `PATCH /schools/:school_id/feeds/:feed_id` — Update a feed item.
///
/// # Errors
///
/// Returns [`ApiError::FeedNotFound`], [`ApiError::SchoolNotFound`], or
/// [`ApiError::PermissionDenied`].
#[utoipa::path(
    patch,
    path = "/api/v1/schools/{school_id}/feeds/{feed_id}",
    tag = "Feeds",
    summary = "Update a feed item",
    params(
        ("school_id" = uuid::Uuid, Path, description = "School page UUID"),
        ("feed_id" = uuid::Uuid, Path, description = "Feed UUID"),
    ),
    request_body = UpdateFeedRequest,
    responses(
        (status = 204, description = "Feed updated"),
        (status = 403, description = "Not an admin of this page", body = ErrorResponse),
        (status = 404, description = "School or feed not found", body = ErrorResponse),
    )
)]
pub async fn update_feed(
    State(state): State<AppState>,
    caller: AuthUser,
    Path((school_id, feed_id)): Path<(uuid::Uuid, uuid::Uuid)>,
    Json(req): Json<UpdateFeedRequest>,
) -> Result<impl IntoResponse, ApiError> {
    caller.require_role(Role::Admin)?;
    state
        .feeds
        .update(caller.id, school_id, feed_id, req.into())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /schools/:school_id/feeds/:feed_id` — Delete a feed item.
///
/// # Errors
///
/// Returns [`ApiError::FeedNotFound`], [`ApiError::SchoolNotFound`], or
/// [`ApiError::PermissionDenied`].
#[utoipa::path(
    delete,
    path = "/api/v1/schools/{school_id}/feeds/{feed_id}",
    tag = "Feeds",
    summary = "Delete a feed item",
    params(
        ("school_id" = uuid::Uuid, Path, description = "School page UUID"),
        ("feed_id" = uuid::Uuid, Path, description = "Feed UUID"),
    ),
    responses(
        (status = 204, description = "Feed deleted"),
        (status = 403, description = "Not an admin of this page", body = ErrorResponse),
        (status = 404, description = "School or feed not found", body = ErrorResponse),
    )
)]
pub async fn delete_feed(
    State(state): State<AppState>,
    caller: AuthUser,
    Path((school_id, feed_id)): Path<(uuid::Uuid, uuid::Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    caller.require_role(Role::Admin)?;
    state.feeds.delete(caller.id, school_id, feed_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /schools/:school_id/feeds` — One school's feed, newest first.
///
/// # Errors
///
/// Returns [`ApiError::PermissionDenied`] if the caller does not
/// subscribe to the page, or [`ApiError::SchoolNotFound`].
#[utoipa::path(
    get,
    path = "/api/v1/schools/{school_id}/feeds",
    tag = "Feeds",
    summary = "Read a school page's feed",
    params(
        ("school_id" = uuid::Uuid, Path, description = "School page UUID"),
    ),
    responses(
        (status = 200, description = "Feed items, newest first", body = Vec<FeedResponse>),
        (status = 403, description = "Not subscribed to this page", body = ErrorResponse),
        (status = 404, description = "School not found", body = ErrorResponse),
    )
)]
pub async fn school_feeds(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(school_id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    caller.require_role(Role::Student)?;
    let feeds = state
        .feeds
        .school_feeds(caller.id, &caller.email, school_id)
        .await?;
    let body: Vec<FeedResponse> = feeds.into_iter().map(FeedResponse::from).collect();
    Ok(Json(body))
}

/// `GET /feeds` — The caller's aggregated news feed.
///
/// Merges live subscribed-school feeds with archived snapshot feeds,
/// newest first.
///
/// # Errors
///
/// Returns [`ApiError::Unauthenticated`] without a valid credential.
#[utoipa::path(
    get,
    path = "/api/v1/feeds",
    tag = "Feeds",
    summary = "Read the aggregated user feed",
    description = "Feeds from active subscriptions (since each subscribed_at) merged with archived unsubscribed-feed snapshots, sorted newest first.",
    responses(
        (status = 200, description = "Merged feed, newest first", body = Vec<FeedResponse>),
        (status = 401, description = "Missing or invalid credential", body = ErrorResponse),
    )
)]
pub async fn user_feed(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    caller.require_role(Role::Student)?;
    let feeds = state.feeds.user_feed(caller.id, &caller.email).await?;
    let body: Vec<FeedResponse> = feeds.into_iter().map(FeedResponse::from).collect();
    Ok(Json(body))
}

/// Feed routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/schools/{school_id}/feeds",
            get(school_feeds).post(create_feed),
        )
        .route(
            "/schools/{school_id}/feeds/{feed_id}",
            axum::routing::patch(update_feed).delete(delete_feed),
        )
        .route("/feeds", get(user_feed))
}
