//! Feed items and unsubscribed-feed snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Embedded school reference carried by every feed item.
///
/// A snapshot of (id, name) at posting time, so archived feeds keep the
/// school name they were posted under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolRef {
    /// School page id.
    pub id: Uuid,
    /// School name at posting time.
    pub name: String,
}

/// A single posted news item.
///
/// Keyed by (id, created_at); `created_at` is the sort key for window
/// queries. Only `subject` and `content` are mutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    /// Generated feed id (v4).
    pub id: Uuid,
    /// School the item was posted on.
    pub school: SchoolRef,
    /// Headline.
    pub subject: String,
    /// Body text.
    pub content: String,
    /// Posting time; part of the storage key.
    pub created_at: DateTime<Utc>,
}

impl Feed {
    /// Creates a feed item for the given school, stamped with the current time.
    #[must_use]
    pub fn new(school: SchoolRef, subject: String, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            school,
            subject,
            content,
            created_at: Utc::now(),
        }
    }
}

/// Archival copy of the feeds a user could see during a now-ended
/// subscription window.
///
/// Written exactly once per unsubscribe event and never mutated; a user
/// accumulates one row per subscribe/unsubscribe cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSnapshot {
    /// User that unsubscribed.
    pub user_id: Uuid,
    /// Feeds captured from the subscription window, in capture order.
    pub feeds: Vec<Feed>,
    /// When the unsubscribe happened; part of the storage key.
    pub created_at: DateTime<Utc>,
}

/// Sorts feeds newest-first.
///
/// Descending by `created_at`; equal timestamps tie-break ascending by
/// feed id so repeated reads return an identical order.
pub fn sort_newest_first(feeds: &mut [Feed]) {
    feeds.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
}
