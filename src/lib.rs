//! # campus-feed
//!
//! REST backend for a school-subscription news-feed product: users sign
//! up and authenticate, school admins create pages and post feed items,
//! and students subscribe to pages and read a merged, reverse-
//! chronological news feed.
//!
//! Unsubscribing archives the feeds posted during the subscription
//! window into an immutable snapshot, atomically with the subscription
//! removal, so history stays visible after the subscription ends.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── Services (service/)
//!     │     auth, users, schools, subscriptions, feeds
//!     │
//!     ├── Store contract (store/)
//!     │
//!     └── PostgreSQL (store/postgres)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod store;
