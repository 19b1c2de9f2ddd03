//! API error types with HTTP status code mapping.
//!
//! [`ApiError`] is the central error type. Each variant maps to a
//! specific HTTP status code and a structured JSON error response. All
//! client errors are non-retryable; store failures surface unchanged as
//! opaque server errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::store::StoreError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2101,
///     "message": "already subscribed to school ...",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`ApiError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status               |
/// |-----------|-------------------|---------------------------|
/// | 1000–1999 | Validation        | 400 Bad Request           |
/// | 2000–2099 | Not Found         | 404 Not Found             |
/// | 2100–2199 | State Conflict    | 409 Conflict              |
/// | 3000–3999 | Server / Store    | 500 Internal Server Error |
/// | 4001/4003 | Auth / Permission | 401 / 403                 |
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// School page with the given id was not found.
    #[error("school not found: {0}")]
    SchoolNotFound(uuid::Uuid),

    /// Feed item with the given id was not found.
    #[error("feed not found: {0}")]
    FeedNotFound(uuid::Uuid),

    /// Unknown region name.
    #[error("region does not exist: {0}")]
    RegionNotFound(String),

    /// Identity key resolved to no account.
    #[error("user not found")]
    UserNotFound,

    /// The user already subscribes to the school page.
    #[error("already subscribed to school {0}")]
    AlreadySubscribed(uuid::Uuid),

    /// The user does not currently subscribe to the school page.
    #[error("not subscribed to school {0}")]
    NotSubscribed(uuid::Uuid),

    /// Sign-up with an email that is already registered.
    #[error("email already exists: {0}")]
    EmailTaken(String),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Missing or invalid credential.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Caller lacks the required role or is not a resource admin.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Storage layer failure, including unsubscribe transaction aborts.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::SchoolNotFound(_) => 2001,
            Self::FeedNotFound(_) => 2002,
            Self::RegionNotFound(_) => 2003,
            Self::UserNotFound => 2004,
            Self::AlreadySubscribed(_) => 2101,
            Self::NotSubscribed(_) => 2102,
            Self::EmailTaken(_) => 2103,
            Self::Unauthenticated(_) => 4001,
            Self::PermissionDenied(_) => 4003,
            Self::Store(_) => 3001,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::SchoolNotFound(_)
            | Self::FeedNotFound(_)
            | Self::RegionNotFound(_)
            | Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::AlreadySubscribed(_) | Self::NotSubscribed(_) | Self::EmailTaken(_) => {
                StatusCode::CONFLICT
            }
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::PermissionDenied(_) => StatusCode::FORBIDDEN,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_distinct_statuses() {
        let id = uuid::Uuid::new_v4();
        assert_eq!(
            ApiError::SchoolNotFound(id).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::AlreadySubscribed(id).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::NotSubscribed(id).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Unauthenticated(String::new()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::PermissionDenied(String::new()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Store(StoreError::TxAborted(String::new())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
