//! Storage layer: the document-store contract and its implementations.
//!
//! [`Store`] captures the operation contract the services rely on: keyed
//! gets, partition queries, a half-open window query on the feed sort
//! key, and the single atomic multi-document write used by unsubscribe.
//!
//! The subscription set is a list attribute with an append primitive but
//! no item-level remove; removal is a whole-attribute overwrite and only
//! happens inside [`Store::commit_unsubscribe`], together with the
//! snapshot insert, as one all-or-nothing transaction. Callers never see
//! the read-modify-write.

pub mod memory;
pub mod postgres;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Feed, FeedSnapshot, School, Subscription, User};

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Storage-level failure.
///
/// Store errors are opaque to clients: they surface as server errors and
/// are never retried by the services.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached or rejected the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The unsubscribe transaction aborted; neither write was applied.
    #[error("transaction aborted: {0}")]
    TxAborted(String),

    /// A stored row could not be decoded into its domain type.
    #[error("corrupt row: {0}")]
    Decode(String),
}

/// Fields of a feed item that may change after creation.
#[derive(Debug, Clone, Default)]
pub struct FeedPatch {
    /// New headline, if updating.
    pub subject: Option<String>,
    /// New body text, if updating.
    pub content: Option<String>,
}

/// Document-store operation contract over the four collections:
/// users, schools, feeds, and unsubscribed-feed snapshots.
pub trait Store: Send + Sync {
    /// Inserts a new user row.
    fn create_user(&self, user: &User) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Scan-by-email; returns the matching user, if any.
    fn find_user_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;

    /// Partition query by user id.
    fn find_user_by_id(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;

    /// Keyed get on the (id, email) identity key.
    fn get_user(
        &self,
        id: Uuid,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;

    /// Appends one entry to the user's subscription list attribute.
    /// Errors if the identity key matches no row.
    fn append_subscription(
        &self,
        id: Uuid,
        email: &str,
        entry: &Subscription,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// The unsubscribe transaction: inserts `snapshot` and overwrites the
    /// user's subscription set with `remaining`, atomically. On failure
    /// neither write is observable.
    fn commit_unsubscribe(
        &self,
        id: Uuid,
        email: &str,
        remaining: &[Subscription],
        snapshot: &FeedSnapshot,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Returns `true` if the region name is known.
    fn region_exists(&self, name: &str)
    -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Inserts a new school page.
    fn create_school(
        &self,
        school: &School,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Keyed get by school id.
    fn find_school(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<School>, StoreError>> + Send;

    /// Batch get by school ids; missing ids are skipped.
    fn find_schools(
        &self,
        ids: &[Uuid],
    ) -> impl Future<Output = Result<Vec<School>, StoreError>> + Send;

    /// Inserts a new feed row under its compound key.
    fn create_feed(&self, feed: &Feed) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Partition query by feed id (the hash key half of the compound key).
    fn find_feed(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Feed>, StoreError>> + Send;

    /// Partial update on the compound key; returns `false` if no row matched.
    fn update_feed(
        &self,
        id: Uuid,
        created_at: DateTime<Utc>,
        patch: &FeedPatch,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Delete on the compound key; returns `false` if no row matched.
    fn delete_feed(
        &self,
        id: Uuid,
        created_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Scan-with-filter over a school's feeds. No ordering guarantee;
    /// callers sort after fetch.
    fn feeds_by_school(
        &self,
        school_id: Uuid,
    ) -> impl Future<Output = Result<Vec<Feed>, StoreError>> + Send;

    /// Window query on the sort key: feeds of `school_id` with
    /// `created_at` in `[from, until)`, or `created_at >= from` when
    /// `until` is `None`.
    fn feeds_in_window(
        &self,
        school_id: Uuid,
        from: DateTime<Utc>,
        until: Option<DateTime<Utc>>,
    ) -> impl Future<Output = Result<Vec<Feed>, StoreError>> + Send;

    /// All snapshot rows for a user, across every unsubscribe event.
    fn snapshots_for_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = Result<Vec<FeedSnapshot>, StoreError>> + Send;
}
