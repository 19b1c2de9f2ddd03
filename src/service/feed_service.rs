//! Feed CRUD and the aggregated user feed.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Feed, SchoolRef, sort_newest_first};
use crate::error::ApiError;
use crate::store::{FeedPatch, Store};

/// Feed repository operations plus the two read views: a single school's
/// page feed and the merged per-user news feed.
#[derive(Debug, Clone)]
pub struct FeedService<S> {
    store: Arc<S>,
}

impl<S: Store> FeedService<S> {
    /// Creates a new `FeedService`.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Posts a feed item on a school page.
    ///
    /// The actor must be in the page's admin set; nothing is written
    /// otherwise.
    ///
    /// # Errors
    ///
    /// [`ApiError::SchoolNotFound`], [`ApiError::PermissionDenied`], or a
    /// store error.
    pub async fn create(
        &self,
        actor: Uuid,
        school_id: Uuid,
        subject: String,
        content: String,
    ) -> Result<Feed, ApiError> {
        let school = self
            .store
            .find_school(school_id)
            .await?
            .ok_or(ApiError::SchoolNotFound(school_id))?;

        if !school.is_admin(actor) {
            return Err(ApiError::PermissionDenied(
                "not an admin of this school page".to_string(),
            ));
        }

        let feed = Feed::new(
            SchoolRef {
                id: school.id,
                name: school.name,
            },
            subject,
            content,
        );
        self.store.create_feed(&feed).await?;

        tracing::info!(feed_id = %feed.id, %school_id, "feed created");
        Ok(feed)
    }

    /// Updates subject/content of a feed item.
    ///
    /// # Errors
    ///
    /// [`ApiError::SchoolNotFound`], [`ApiError::PermissionDenied`],
    /// [`ApiError::FeedNotFound`], or a store error.
    pub async fn update(
        &self,
        actor: Uuid,
        school_id: Uuid,
        feed_id: Uuid,
        patch: FeedPatch,
    ) -> Result<(), ApiError> {
        let feed = self.locate_for_admin(actor, school_id, feed_id).await?;
        if !self.store.update_feed(feed.id, feed.created_at, &patch).await? {
            return Err(ApiError::FeedNotFound(feed_id));
        }
        Ok(())
    }

    /// Deletes a feed item.
    ///
    /// # Errors
    ///
    /// [`ApiError::SchoolNotFound`], [`ApiError::PermissionDenied`],
    /// [`ApiError::FeedNotFound`], or a store error.
    pub async fn delete(
        &self,
        actor: Uuid,
        school_id: Uuid,
        feed_id: Uuid,
    ) -> Result<(), ApiError> {
        let feed = self.locate_for_admin(actor, school_id, feed_id).await?;
        if !self.store.delete_feed(feed.id, feed.created_at).await? {
            return Err(ApiError::FeedNotFound(feed_id));
        }
        tracing::info!(%feed_id, %school_id, "feed deleted");
        Ok(())
    }

    /// Resolves the compound key of a feed behind an admin check.
    async fn locate_for_admin(
        &self,
        actor: Uuid,
        school_id: Uuid,
        feed_id: Uuid,
    ) -> Result<Feed, ApiError> {
        let school = self
            .store
            .find_school(school_id)
            .await?
            .ok_or(ApiError::SchoolNotFound(school_id))?;

        if !school.is_admin(actor) {
            return Err(ApiError::PermissionDenied(
                "not an admin of this school page".to_string(),
            ));
        }

        let feed = self
            .store
            .find_feed(feed_id)
            .await?
            .ok_or(ApiError::FeedNotFound(feed_id))?;

        // The admin check above covers `school_id` only; a feed id
        // belonging to another school must not resolve through it.
        if feed.school.id != school_id {
            return Err(ApiError::FeedNotFound(feed_id));
        }
        Ok(feed)
    }

    /// Returns one school's feed, newest first.
    ///
    /// The caller must currently subscribe to the page.
    ///
    /// # Errors
    ///
    /// [`ApiError::SchoolNotFound`], [`ApiError::UserNotFound`],
    /// [`ApiError::PermissionDenied`] if not subscribed, or a store error.
    pub async fn school_feeds(
        &self,
        user_id: Uuid,
        email: &str,
        school_id: Uuid,
    ) -> Result<Vec<Feed>, ApiError> {
        self.store
            .find_school(school_id)
            .await?
            .ok_or(ApiError::SchoolNotFound(school_id))?;

        let user = self
            .store
            .get_user(user_id, email)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        if !user.is_subscribed(school_id) {
            return Err(ApiError::PermissionDenied(
                "must subscribe to the school page".to_string(),
            ));
        }

        // The scan gives no order; sort after fetch.
        let mut feeds = self.store.feeds_by_school(school_id).await?;
        sort_newest_first(&mut feeds);
        Ok(feeds)
    }

    /// Returns the user's aggregated news feed, newest first.
    ///
    /// Merges two sources: live feeds of each active subscription from
    /// its `subscribed_at` onwards, and the flattened feeds of every
    /// unsubscribed-feed snapshot. The two sources are disjoint by
    /// construction, so no deduplication happens.
    ///
    /// # Errors
    ///
    /// [`ApiError::UserNotFound`] or a store error.
    pub async fn user_feed(&self, user_id: Uuid, email: &str) -> Result<Vec<Feed>, ApiError> {
        let user = self
            .store
            .get_user(user_id, email)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        let mut merged = Vec::new();
        for sub in &user.subscriptions {
            let live = self
                .store
                .feeds_in_window(sub.school_id, sub.subscribed_at, None)
                .await?;
            merged.extend(live);
        }

        for snapshot in self.store.snapshots_for_user(user_id).await? {
            merged.extend(snapshot.feeds);
        }

        sort_newest_first(&mut merged);
        Ok(merged)
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::domain::{Role, School, Subscription, User};
    use crate::service::SubscriptionService;
    use crate::store::MemoryStore;
    use chrono::{DateTime, Duration, Utc};

    struct Fixture {
        store: Arc<MemoryStore>,
        feeds: FeedService<MemoryStore>,
        subs: SubscriptionService<MemoryStore>,
        student: User,
        admin: User,
        school: School,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let feeds = FeedService::new(Arc::clone(&store));
        let subs = SubscriptionService::new(Arc::clone(&store));

        let student = User {
            id: Uuid::new_v4(),
            email: "student@example.com".to_string(),
            password_hash: "h".to_string(),
            role: Role::Student,
            subscriptions: vec![],
        };
        let admin = User {
            id: Uuid::new_v4(),
            email: "admin@example.com".to_string(),
            password_hash: "h".to_string(),
            role: Role::Admin,
            subscriptions: vec![],
        };
        store.create_user(&student).await.unwrap();
        store.create_user(&admin).await.unwrap();

        store.add_region("Seoul").await;
        let school = School::new("Haengbok High".to_string(), "Seoul".to_string(), admin.id);
        store.create_school(&school).await.unwrap();

        Fixture {
            store,
            feeds,
            subs,
            student,
            admin,
            school,
        }
    }

    async fn insert_feed_at(fx: &Fixture, at: DateTime<Utc>) -> Feed {
        let feed = Feed {
            id: Uuid::new_v4(),
            school: SchoolRef {
                id: fx.school.id,
                name: fx.school.name.clone(),
            },
            subject: "subject".to_string(),
            content: "content".to_string(),
            created_at: at,
        };
        fx.store.create_feed(&feed).await.unwrap();
        feed
    }

    fn assert_newest_first(feeds: &[Feed]) {
        for pair in feeds.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    #[tokio::test]
    async fn admin_posts_feed() {
        let fx = fixture().await;
        let feed = fx
            .feeds
            .create(
                fx.admin.id,
                fx.school.id,
                "first news".to_string(),
                "hello".to_string(),
            )
            .await
            .unwrap();
        assert_eq!(feed.school.id, fx.school.id);
        assert_eq!(feed.school.name, fx.school.name);
        assert_eq!(fx.store.feed_count().await, 1);
    }

    #[tokio::test]
    async fn non_admin_post_writes_nothing() {
        let fx = fixture().await;
        let err = fx
            .feeds
            .create(
                fx.student.id,
                fx.school.id,
                "s".to_string(),
                "c".to_string(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::PermissionDenied(_)));
        assert_eq!(fx.store.feed_count().await, 0);
    }

    #[tokio::test]
    async fn update_changes_only_patched_fields() {
        let fx = fixture().await;
        let feed = fx
            .feeds
            .create(fx.admin.id, fx.school.id, "s".to_string(), "c".to_string())
            .await
            .unwrap();

        fx.feeds
            .update(
                fx.admin.id,
                fx.school.id,
                feed.id,
                FeedPatch {
                    subject: Some("patched".to_string()),
                    content: None,
                },
            )
            .await
            .unwrap();

        let stored = fx.store.find_feed(feed.id).await.unwrap().unwrap();
        assert_eq!(stored.subject, "patched");
        assert_eq!(stored.content, "c");
    }

    #[tokio::test]
    async fn update_unknown_feed_fails() {
        let fx = fixture().await;
        let err = fx
            .feeds
            .update(fx.admin.id, fx.school.id, Uuid::new_v4(), FeedPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::FeedNotFound(_)));
    }

    #[tokio::test]
    async fn delete_removes_row() {
        let fx = fixture().await;
        let feed = fx
            .feeds
            .create(fx.admin.id, fx.school.id, "s".to_string(), "c".to_string())
            .await
            .unwrap();
        fx.feeds
            .delete(fx.admin.id, fx.school.id, feed.id)
            .await
            .unwrap();
        assert_eq!(fx.store.feed_count().await, 0);
    }

    #[tokio::test]
    async fn foreign_feed_is_unreachable_through_own_school() {
        let fx = fixture().await;

        // Second school with a different admin and one feed of its own.
        let foreign_school =
            School::new("Other High".to_string(), "Seoul".to_string(), Uuid::new_v4());
        fx.store.create_school(&foreign_school).await.unwrap();
        let foreign = Feed::new(
            SchoolRef {
                id: foreign_school.id,
                name: foreign_school.name.clone(),
            },
            "their subject".to_string(),
            "their content".to_string(),
        );
        fx.store.create_feed(&foreign).await.unwrap();

        // Admin of the first school names their own school but the
        // foreign feed id; neither delete nor update may resolve it.
        let err = fx
            .feeds
            .delete(fx.admin.id, fx.school.id, foreign.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::FeedNotFound(_)));
        assert!(fx.store.find_feed(foreign.id).await.unwrap().is_some());

        let err = fx
            .feeds
            .update(
                fx.admin.id,
                fx.school.id,
                foreign.id,
                FeedPatch {
                    subject: Some("hijacked".to_string()),
                    content: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::FeedNotFound(_)));

        let stored = fx.store.find_feed(foreign.id).await.unwrap().unwrap();
        assert_eq!(stored.subject, "their subject");
    }

    #[tokio::test]
    async fn school_feeds_requires_subscription() {
        let fx = fixture().await;
        let err = fx
            .feeds
            .school_feeds(fx.student.id, &fx.student.email, fx.school.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn school_feeds_sorted_newest_first() {
        let fx = fixture().await;
        let now = Utc::now();
        for secs in [500, 100, 300] {
            insert_feed_at(&fx, now - Duration::seconds(secs)).await;
        }
        fx.store
            .append_subscription(
                fx.student.id,
                &fx.student.email,
                &Subscription {
                    school_id: fx.school.id,
                    subscribed_at: now - Duration::seconds(600),
                },
            )
            .await
            .unwrap();

        let feeds = fx
            .feeds
            .school_feeds(fx.student.id, &fx.student.email, fx.school.id)
            .await
            .unwrap();
        assert_eq!(feeds.len(), 3);
        assert_newest_first(&feeds);
    }

    // Scenario: subscribe at t=100, feeds at t=150 and t=300, unsubscribe
    // at t=400. The snapshot holds both feeds and the aggregated feed
    // keeps surfacing them, newest first.
    #[tokio::test]
    async fn feed_survives_unsubscribe_via_snapshot() {
        let fx = fixture().await;
        let now = Utc::now();
        let t = |secs: i64| now - Duration::seconds(400 - secs);

        fx.store
            .append_subscription(
                fx.student.id,
                &fx.student.email,
                &Subscription {
                    school_id: fx.school.id,
                    subscribed_at: t(100),
                },
            )
            .await
            .unwrap();
        let f150 = insert_feed_at(&fx, t(150)).await;
        let f300 = insert_feed_at(&fx, t(300)).await;

        let before: Vec<Uuid> = fx
            .feeds
            .user_feed(fx.student.id, &fx.student.email)
            .await
            .unwrap()
            .iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(before, vec![f300.id, f150.id]);

        fx.subs
            .unsubscribe(fx.student.id, &fx.student.email, fx.school.id)
            .await
            .unwrap();

        let snapshots = fx.store.snapshots_for_user(fx.student.id).await.unwrap();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].feeds.len(), 2);

        let after = fx
            .feeds
            .user_feed(fx.student.id, &fx.student.email)
            .await
            .unwrap();
        let after_ids: Vec<Uuid> = after.iter().map(|f| f.id).collect();
        // Same feeds, same order, now sourced from the snapshot.
        assert_eq!(after_ids, before);
        assert_newest_first(&after);
    }

    #[tokio::test]
    async fn user_feed_starts_at_subscription_time() {
        let fx = fixture().await;
        let now = Utc::now();

        insert_feed_at(&fx, now - Duration::seconds(500)).await;
        let visible = insert_feed_at(&fx, now - Duration::seconds(100)).await;
        fx.store
            .append_subscription(
                fx.student.id,
                &fx.student.email,
                &Subscription {
                    school_id: fx.school.id,
                    subscribed_at: now - Duration::seconds(200),
                },
            )
            .await
            .unwrap();

        let feeds = fx
            .feeds
            .user_feed(fx.student.id, &fx.student.email)
            .await
            .unwrap();
        assert_eq!(feeds.len(), 1);
        assert_eq!(feeds[0].id, visible.id);
    }

    #[tokio::test]
    async fn user_feed_read_is_idempotent() {
        let fx = fixture().await;
        let now = Utc::now();
        for secs in [400, 300, 200, 100] {
            insert_feed_at(&fx, now - Duration::seconds(secs)).await;
        }
        fx.store
            .append_subscription(
                fx.student.id,
                &fx.student.email,
                &Subscription {
                    school_id: fx.school.id,
                    subscribed_at: now - Duration::seconds(500),
                },
            )
            .await
            .unwrap();

        let first = fx
            .feeds
            .user_feed(fx.student.id, &fx.student.email)
            .await
            .unwrap();
        let second = fx
            .feeds
            .user_feed(fx.student.id, &fx.student.email)
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_newest_first(&first);
    }

    #[tokio::test]
    async fn user_feed_merges_live_and_snapshot_sources() {
        let fx = fixture().await;
        let now = Utc::now();

        // Second school the student stays subscribed to.
        let other_admin = Uuid::new_v4();
        let other = School::new("Other High".to_string(), "Seoul".to_string(), other_admin);
        fx.store.create_school(&other).await.unwrap();

        // Cycle on the first school: subscribe, one feed, unsubscribe.
        fx.store
            .append_subscription(
                fx.student.id,
                &fx.student.email,
                &Subscription {
                    school_id: fx.school.id,
                    subscribed_at: now - Duration::seconds(300),
                },
            )
            .await
            .unwrap();
        let archived = insert_feed_at(&fx, now - Duration::seconds(200)).await;
        fx.subs
            .unsubscribe(fx.student.id, &fx.student.email, fx.school.id)
            .await
            .unwrap();

        // Live subscription on the second school.
        fx.subs
            .subscribe(fx.student.id, &fx.student.email, other.id)
            .await
            .unwrap();
        let live = Feed::new(
            SchoolRef {
                id: other.id,
                name: other.name.clone(),
            },
            "live".to_string(),
            "news".to_string(),
        );
        fx.store.create_feed(&live).await.unwrap();

        let feeds = fx
            .feeds
            .user_feed(fx.student.id, &fx.student.email)
            .await
            .unwrap();
        let ids: Vec<Uuid> = feeds.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![live.id, archived.id]);
    }
}
