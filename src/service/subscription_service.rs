//! Subscription lifecycle: subscribe, unsubscribe, and the unsubscribe
//! snapshot transaction.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{FeedSnapshot, School, Subscription, UserProfile};
use crate::error::ApiError;
use crate::store::Store;

/// Owns subscribe/unsubscribe transitions for (user, school) pairs.
///
/// Unsubscribe is the one multi-document operation in the system: it
/// captures the feeds of the ending subscription window into a snapshot
/// row and rewrites the user's subscription set, as a single
/// all-or-nothing store transaction.
#[derive(Debug, Clone)]
pub struct SubscriptionService<S> {
    store: Arc<S>,
}

impl<S: Store> SubscriptionService<S> {
    /// Creates a new `SubscriptionService`.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Subscribes the user to a school page.
    ///
    /// # Errors
    ///
    /// [`ApiError::SchoolNotFound`] if the school does not exist,
    /// [`ApiError::AlreadySubscribed`] if an entry for the school is
    /// already present, or a store error.
    pub async fn subscribe(
        &self,
        user_id: Uuid,
        email: &str,
        school_id: Uuid,
    ) -> Result<UserProfile, ApiError> {
        self.store
            .find_school(school_id)
            .await?
            .ok_or(ApiError::SchoolNotFound(school_id))?;

        let user = self
            .store
            .get_user(user_id, email)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        if user.is_subscribed(school_id) {
            return Err(ApiError::AlreadySubscribed(school_id));
        }

        let entry = Subscription {
            school_id,
            subscribed_at: Utc::now(),
        };
        self.store
            .append_subscription(user_id, email, &entry)
            .await?;

        tracing::info!(%user_id, %school_id, "subscribed to school page");

        let mut profile = user.profile();
        profile.subscriptions.push(entry);
        Ok(profile)
    }

    /// Unsubscribes the user from a school page.
    ///
    /// Captures every feed the school posted during the subscription
    /// window `[subscribed_at, now)` — `now` taken once at call time —
    /// into a snapshot row, then removes the subscription entry. Both
    /// writes commit atomically; on abort neither is observable.
    ///
    /// # Errors
    ///
    /// [`ApiError::SchoolNotFound`] if the school does not exist,
    /// [`ApiError::NotSubscribed`] if no entry for the school is present,
    /// or a store error (including transaction abort).
    pub async fn unsubscribe(
        &self,
        user_id: Uuid,
        email: &str,
        school_id: Uuid,
    ) -> Result<UserProfile, ApiError> {
        self.store
            .find_school(school_id)
            .await?
            .ok_or(ApiError::SchoolNotFound(school_id))?;

        let user = self
            .store
            .get_user(user_id, email)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        let entry = user
            .subscription(school_id)
            .ok_or(ApiError::NotSubscribed(school_id))?;

        let now = Utc::now();
        let window_feeds = self
            .store
            .feeds_in_window(school_id, entry.subscribed_at, Some(now))
            .await?;

        let snapshot = FeedSnapshot {
            user_id,
            feeds: window_feeds,
            created_at: now,
        };

        let remaining: Vec<Subscription> = user
            .subscriptions
            .iter()
            .filter(|s| s.school_id != school_id)
            .cloned()
            .collect();

        // Snapshot insert + whole-set overwrite, one transaction. A
        // concurrent subscribe to a different school can still race this
        // overwrite; the store's per-row atomicity is the only guard.
        self.store
            .commit_unsubscribe(user_id, email, &remaining, &snapshot)
            .await?;

        tracing::info!(
            %user_id,
            %school_id,
            captured = snapshot.feeds.len(),
            "unsubscribed from school page"
        );

        let mut profile = user.profile();
        profile.subscriptions = remaining;
        Ok(profile)
    }

    /// Returns the school pages the user currently subscribes to.
    ///
    /// # Errors
    ///
    /// [`ApiError::UserNotFound`] if the identity key resolves to no
    /// account, or a store error.
    pub async fn subscribed_pages(
        &self,
        user_id: Uuid,
        email: &str,
    ) -> Result<Vec<School>, ApiError> {
        let user = self
            .store
            .get_user(user_id, email)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        if user.subscriptions.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = user.subscriptions.iter().map(|s| s.school_id).collect();
        Ok(self.store.find_schools(&ids).await?)
    }
}
