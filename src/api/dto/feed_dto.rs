//! Feed DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Feed;
use crate::store::FeedPatch;

/// Request body for posting a feed item.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateFeedRequest {
    /// Headline.
    pub subject: String,
    /// Body text.
    pub content: String,
}

/// Request body for updating a feed item; omitted fields keep their
/// current value.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateFeedRequest {
    /// New headline.
    #[serde(default)]
    pub subject: Option<String>,
    /// New body text.
    #[serde(default)]
    pub content: Option<String>,
}

impl From<UpdateFeedRequest> for FeedPatch {
    fn from(req: UpdateFeedRequest) -> Self {
        Self {
            subject: req.subject,
            content: req.content,
        }
    }
}

/// Embedded school reference on a feed item.
#[derive(Debug, Serialize, ToSchema)]
pub struct SchoolRefDto {
    /// School page id.
    pub id: Uuid,
    /// School name at posting time.
    pub name: String,
}

/// One feed item as returned by all feed reads.
#[derive(Debug, Serialize, ToSchema)]
pub struct FeedResponse {
    /// Feed id.
    pub id: Uuid,
    /// School the item was posted on.
    pub school: SchoolRefDto,
    /// Headline.
    pub subject: String,
    /// Body text.
    pub content: String,
    /// Posting time.
    pub created_at: DateTime<Utc>,
}

impl From<Feed> for FeedResponse {
    fn from(feed: Feed) -> Self {
        Self {
            id: feed.id,
            school: SchoolRefDto {
                id: feed.school.id,
                name: feed.school.name,
            },
            subject: feed.subject,
            content: feed.content,
            created_at: feed.created_at,
        }
    }
}
