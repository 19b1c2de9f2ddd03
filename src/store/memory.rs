//! In-memory store used by the test suite.
//!
//! Tables are `RwLock`-guarded maps keyed the same way as the document
//! collections. A one-shot failure flag lets tests abort the unsubscribe
//! transaction and assert that no partial state leaks.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{FeedPatch, Store, StoreError};
use crate::domain::{Feed, FeedSnapshot, School, Subscription, User};

/// In-memory implementation of [`Store`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<(Uuid, String), User>>,
    regions: RwLock<HashSet<String>>,
    schools: RwLock<HashMap<Uuid, School>>,
    feeds: RwLock<HashMap<(Uuid, DateTime<Utc>), Feed>>,
    snapshots: RwLock<Vec<FeedSnapshot>>,
    fail_next_commit: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a region name.
    pub async fn add_region(&self, name: &str) {
        self.regions.write().await.insert(name.to_string());
    }

    /// Arms the failure flag: the next [`Store::commit_unsubscribe`] call
    /// aborts without applying either write.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Number of stored feed rows.
    pub async fn feed_count(&self) -> usize {
        self.feeds.read().await.len()
    }

    /// Number of stored snapshot rows.
    pub async fn snapshot_count(&self) -> usize {
        self.snapshots.read().await.len()
    }
}

impl Store for MemoryStore {
    async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        self.users
            .write()
            .await
            .insert((user.id, user.email.clone()), user.clone());
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn get_user(&self, id: Uuid, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .get(&(id, email.to_string()))
            .cloned())
    }

    async fn append_subscription(
        &self,
        id: Uuid,
        email: &str,
        entry: &Subscription,
    ) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&(id, email.to_string()))
            .ok_or_else(|| StoreError::Unavailable("user row missing".to_string()))?;
        user.subscriptions.push(entry.clone());
        Ok(())
    }

    async fn commit_unsubscribe(
        &self,
        id: Uuid,
        email: &str,
        remaining: &[Subscription],
        snapshot: &FeedSnapshot,
    ) -> Result<(), StoreError> {
        // Both table locks held across the whole commit.
        let mut users = self.users.write().await;
        let mut snapshots = self.snapshots.write().await;

        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(StoreError::TxAborted("injected write failure".to_string()));
        }

        let user = users
            .get_mut(&(id, email.to_string()))
            .ok_or_else(|| StoreError::TxAborted("user row missing".to_string()))?;

        snapshots.push(snapshot.clone());
        user.subscriptions = remaining.to_vec();
        Ok(())
    }

    async fn region_exists(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.regions.read().await.contains(name))
    }

    async fn create_school(&self, school: &School) -> Result<(), StoreError> {
        self.schools
            .write()
            .await
            .insert(school.id, school.clone());
        Ok(())
    }

    async fn find_school(&self, id: Uuid) -> Result<Option<School>, StoreError> {
        Ok(self.schools.read().await.get(&id).cloned())
    }

    async fn find_schools(&self, ids: &[Uuid]) -> Result<Vec<School>, StoreError> {
        let schools = self.schools.read().await;
        Ok(ids.iter().filter_map(|id| schools.get(id).cloned()).collect())
    }

    async fn create_feed(&self, feed: &Feed) -> Result<(), StoreError> {
        self.feeds
            .write()
            .await
            .insert((feed.id, feed.created_at), feed.clone());
        Ok(())
    }

    async fn find_feed(&self, id: Uuid) -> Result<Option<Feed>, StoreError> {
        Ok(self
            .feeds
            .read()
            .await
            .values()
            .find(|f| f.id == id)
            .cloned())
    }

    async fn update_feed(
        &self,
        id: Uuid,
        created_at: DateTime<Utc>,
        patch: &FeedPatch,
    ) -> Result<bool, StoreError> {
        let mut feeds = self.feeds.write().await;
        match feeds.get_mut(&(id, created_at)) {
            Some(feed) => {
                if let Some(subject) = &patch.subject {
                    feed.subject = subject.clone();
                }
                if let Some(content) = &patch.content {
                    feed.content = content.clone();
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_feed(&self, id: Uuid, created_at: DateTime<Utc>) -> Result<bool, StoreError> {
        Ok(self.feeds.write().await.remove(&(id, created_at)).is_some())
    }

    async fn feeds_by_school(&self, school_id: Uuid) -> Result<Vec<Feed>, StoreError> {
        Ok(self
            .feeds
            .read()
            .await
            .values()
            .filter(|f| f.school.id == school_id)
            .cloned()
            .collect())
    }

    async fn feeds_in_window(
        &self,
        school_id: Uuid,
        from: DateTime<Utc>,
        until: Option<DateTime<Utc>>,
    ) -> Result<Vec<Feed>, StoreError> {
        Ok(self
            .feeds
            .read()
            .await
            .values()
            .filter(|f| {
                f.school.id == school_id
                    && f.created_at >= from
                    && until.is_none_or(|end| f.created_at < end)
            })
            .cloned()
            .collect())
    }

    async fn snapshots_for_user(&self, user_id: Uuid) -> Result<Vec<FeedSnapshot>, StoreError> {
        Ok(self
            .snapshots
            .read()
            .await
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::domain::{Role, SchoolRef};
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    fn feed(school_id: Uuid, secs: i64) -> Feed {
        Feed {
            id: Uuid::new_v4(),
            school: SchoolRef {
                id: school_id,
                name: "school".to_string(),
            },
            subject: "s".to_string(),
            content: "c".to_string(),
            created_at: ts(secs),
        }
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "u@example.com".to_string(),
            password_hash: "h".to_string(),
            role: Role::Student,
            subscriptions: vec![],
        }
    }

    #[tokio::test]
    async fn window_query_is_half_open() {
        let store = MemoryStore::new();
        let school = Uuid::new_v4();
        for secs in [50, 100, 150, 300, 400] {
            store.create_feed(&feed(school, secs)).await.unwrap();
        }

        let rows = store
            .feeds_in_window(school, ts(100), Some(ts(400)))
            .await
            .unwrap();
        let mut secs: Vec<i64> = rows.iter().map(|f| f.created_at.timestamp()).collect();
        secs.sort_unstable();
        // Lower bound inclusive, upper bound exclusive.
        assert_eq!(secs, vec![100, 150, 300]);

        let open = store.feeds_in_window(school, ts(150), None).await.unwrap();
        assert_eq!(open.len(), 3);
    }

    #[tokio::test]
    async fn append_subscription_requires_existing_row() {
        let store = MemoryStore::new();
        let entry = Subscription {
            school_id: Uuid::new_v4(),
            subscribed_at: ts(100),
        };
        let err = store
            .append_subscription(Uuid::new_v4(), "ghost@example.com", &entry)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn commit_unsubscribe_applies_both_writes() {
        let store = MemoryStore::new();
        let school = Uuid::new_v4();
        let mut u = user();
        u.subscriptions.push(Subscription {
            school_id: school,
            subscribed_at: ts(100),
        });
        store.create_user(&u).await.unwrap();

        let snapshot = FeedSnapshot {
            user_id: u.id,
            feeds: vec![feed(school, 150)],
            created_at: ts(400),
        };
        store
            .commit_unsubscribe(u.id, &u.email, &[], &snapshot)
            .await
            .unwrap();

        let stored = store.get_user(u.id, &u.email).await.unwrap().unwrap();
        assert!(stored.subscriptions.is_empty());
        assert_eq!(store.snapshot_count().await, 1);
    }

    #[tokio::test]
    async fn aborted_commit_leaves_no_partial_state() {
        let store = MemoryStore::new();
        let school = Uuid::new_v4();
        let mut u = user();
        u.subscriptions.push(Subscription {
            school_id: school,
            subscribed_at: ts(100),
        });
        store.create_user(&u).await.unwrap();

        let snapshot = FeedSnapshot {
            user_id: u.id,
            feeds: vec![],
            created_at: ts(400),
        };
        store.fail_next_commit();
        let err = store
            .commit_unsubscribe(u.id, &u.email, &[], &snapshot)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::TxAborted(_)));

        // Subscription untouched, no snapshot row.
        let stored = store.get_user(u.id, &u.email).await.unwrap().unwrap();
        assert_eq!(stored.subscriptions.len(), 1);
        assert_eq!(store.snapshot_count().await, 0);
    }

    #[tokio::test]
    async fn feed_compound_key_update_and_delete() {
        let store = MemoryStore::new();
        let school = Uuid::new_v4();
        let f = feed(school, 100);
        store.create_feed(&f).await.unwrap();

        let patch = FeedPatch {
            subject: Some("updated".to_string()),
            content: None,
        };
        // Wrong sort key: no row matched.
        assert!(!store.update_feed(f.id, ts(999), &patch).await.unwrap());
        assert!(store.update_feed(f.id, f.created_at, &patch).await.unwrap());

        let stored = store.find_feed(f.id).await.unwrap().unwrap();
        assert_eq!(stored.subject, "updated");
        assert_eq!(stored.content, "c");

        assert!(store.delete_feed(f.id, f.created_at).await.unwrap());
        assert!(store.find_feed(f.id).await.unwrap().is_none());
    }
}
