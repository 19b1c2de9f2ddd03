//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All endpoints are mounted under `/api/v1` except the root-level
//! health check and, with the `swagger-ui` feature, the interactive
//! API documentation at `/swagger-ui`.

pub mod auth_user;
pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

pub use auth_user::AuthUser;

/// Aggregated OpenAPI document for every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "campus-feed",
        description = "School news-feed pages, subscriptions, and aggregated student feeds",
    ),
    paths(
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::users::sign_up,
        handlers::schools::create_school,
        handlers::schools::list_subscriptions,
        handlers::schools::subscribe,
        handlers::schools::unsubscribe,
        handlers::feeds::create_feed,
        handlers::feeds::update_feed,
        handlers::feeds::delete_feed,
        handlers::feeds::school_feeds,
        handlers::feeds::user_feed,
        handlers::system::health_handler,
    ),
    tags(
        (name = "Auth", description = "Login and token refresh"),
        (name = "Users", description = "Account registration"),
        (name = "Schools", description = "School pages and the subscription lifecycle"),
        (name = "Feeds", description = "Feed items and aggregated reads"),
        (name = "System", description = "Health check"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn openapi_doc_covers_all_routes() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/users/sign-up",
            "/api/v1/auth/login",
            "/api/v1/auth/refresh",
            "/api/v1/schools",
            "/api/v1/schools/subscriptions",
            "/api/v1/schools/{school_id}/subscribe",
            "/api/v1/schools/{school_id}/unsubscribe",
            "/api/v1/schools/{school_id}/feeds",
            "/api/v1/schools/{school_id}/feeds/{feed_id}",
            "/api/v1/feeds",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path}");
        }
    }
}
