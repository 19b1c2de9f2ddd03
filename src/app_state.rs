//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::{AuthService, FeedService, SchoolService, SubscriptionService, UserService};
use crate::store::PostgresStore;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Account sign-up and lookup.
    pub users: Arc<UserService<PostgresStore>>,
    /// Login, refresh, and token verification.
    pub auth: Arc<AuthService<PostgresStore>>,
    /// School page operations.
    pub schools: Arc<SchoolService<PostgresStore>>,
    /// Subscribe/unsubscribe lifecycle.
    pub subscriptions: Arc<SubscriptionService<PostgresStore>>,
    /// Feed CRUD and aggregation.
    pub feeds: Arc<FeedService<PostgresStore>>,
}

impl AppState {
    /// Wires all services over one shared store.
    #[must_use]
    pub fn new(store: PostgresStore, jwt_secret: &str, access_ttl: u64, refresh_ttl: u64) -> Self {
        let store = Arc::new(store);
        Self {
            users: Arc::new(UserService::new(Arc::clone(&store))),
            auth: Arc::new(AuthService::new(
                Arc::clone(&store),
                jwt_secret,
                access_ttl,
                refresh_ttl,
            )),
            schools: Arc::new(SchoolService::new(Arc::clone(&store))),
            subscriptions: Arc::new(SubscriptionService::new(Arc::clone(&store))),
            feeds: Arc::new(FeedService::new(store)),
        }
    }
}
