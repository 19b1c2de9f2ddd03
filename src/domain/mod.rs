//! Domain layer: core data model.
//!
//! This module contains the server-side domain model: users with their
//! roles and subscription sets, school pages, feed items keyed by
//! (id, created_at), and the write-once unsubscribed-feed snapshots.

pub mod feed;
pub mod school;
pub mod user;

pub use feed::{Feed, FeedSnapshot, SchoolRef, sort_newest_first};
pub use school::School;
pub use user::{Role, Subscription, User, UserProfile};
