//! REST endpoint handlers organized by resource.

pub mod auth;
pub mod feeds;
pub mod schools;
pub mod system;
pub mod users;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::routes())
        .merge(users::routes())
        .merge(schools::routes())
        .merge(feeds::routes())
}
