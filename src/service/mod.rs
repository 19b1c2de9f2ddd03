//! Service layer: business logic orchestration.
//!
//! Services are stateless coordinators over a [`crate::store::Store`]
//! implementation. [`SubscriptionService`] owns the subscribe/unsubscribe
//! lifecycle including the snapshot transaction; [`FeedService`] owns
//! feed CRUD and the aggregated user feed.

pub mod auth_service;
pub mod feed_service;
pub mod school_service;
pub mod subscription_service;
pub mod user_service;

pub use auth_service::AuthService;
pub use feed_service::FeedService;
pub use school_service::SchoolService;
pub use subscription_service::SubscriptionService;
pub use user_service::UserService;
