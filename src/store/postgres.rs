//! PostgreSQL implementation of the store contract.
//!
//! List attributes (user subscriptions, snapshot feed lists) live in
//! JSONB columns and are only appended to (`||`) or overwritten as a
//! whole, mirroring the document-store semantics the services assume.
//! The unsubscribe commit runs inside a single transaction.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{FeedPatch, Store, StoreError};
use crate::domain::{Feed, FeedSnapshot, Role, School, SchoolRef, Subscription, User};

/// PostgreSQL-backed [`Store`] using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

type UserRow = (Uuid, String, String, i16, serde_json::Value);
type FeedRow = (Uuid, DateTime<Utc>, Uuid, String, String, String);

impl PostgresStore {
    /// Creates a store over the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn decode_user(row: UserRow) -> Result<User, StoreError> {
        let (id, email, password_hash, role, subscriptions) = row;
        let role = Role::from_level(role)
            .ok_or_else(|| StoreError::Decode(format!("unknown role level {role}")))?;
        let subscriptions: Vec<Subscription> = serde_json::from_value(subscriptions)
            .map_err(|e| StoreError::Decode(format!("subscriptions: {e}")))?;
        Ok(User {
            id,
            email,
            password_hash,
            role,
            subscriptions,
        })
    }

    fn decode_feed(row: FeedRow) -> Feed {
        let (id, created_at, school_id, school_name, subject, content) = row;
        Feed {
            id,
            school: SchoolRef {
                id: school_id,
                name: school_name,
            },
            subject,
            content,
            created_at,
        }
    }
}

const USER_COLUMNS: &str = "id, email, password_hash, role, subscriptions";
const FEED_COLUMNS: &str = "id, created_at, school_id, school_name, subject, content";

fn unavailable(e: sqlx::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

impl Store for PostgresStore {
    async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        let subscriptions = serde_json::to_value(&user.subscriptions)
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, role, subscriptions) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.level())
        .bind(subscriptions)
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;
        row.map(Self::decode_user).transpose()
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;
        row.map(Self::decode_user).transpose()
    }

    async fn get_user(&self, id: Uuid, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND email = $2"
        ))
        .bind(id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;
        row.map(Self::decode_user).transpose()
    }

    async fn append_subscription(
        &self,
        id: Uuid,
        email: &str,
        entry: &Subscription,
    ) -> Result<(), StoreError> {
        let element = serde_json::to_value(vec![entry])
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        let result = sqlx::query(
            "UPDATE users SET subscriptions = subscriptions || $3::jsonb \
             WHERE id = $1 AND email = $2",
        )
        .bind(id)
        .bind(email)
        .bind(element)
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Unavailable("user row missing".to_string()));
        }
        Ok(())
    }

    async fn commit_unsubscribe(
        &self,
        id: Uuid,
        email: &str,
        remaining: &[Subscription],
        snapshot: &FeedSnapshot,
    ) -> Result<(), StoreError> {
        let aborted = |e: sqlx::Error| StoreError::TxAborted(e.to_string());

        let snapshot_feeds = serde_json::to_value(&snapshot.feeds)
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        let remaining = serde_json::to_value(remaining)
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        let mut tx = self.pool.begin().await.map_err(aborted)?;

        sqlx::query("INSERT INTO unsubscribed_feeds (user_id, created_at, feeds) VALUES ($1, $2, $3)")
            .bind(snapshot.user_id)
            .bind(snapshot.created_at)
            .bind(snapshot_feeds)
            .execute(&mut *tx)
            .await
            .map_err(aborted)?;

        // Whole-attribute overwrite; the store has no item-level remove.
        sqlx::query("UPDATE users SET subscriptions = $3 WHERE id = $1 AND email = $2")
            .bind(id)
            .bind(email)
            .bind(remaining)
            .execute(&mut *tx)
            .await
            .map_err(aborted)?;

        tx.commit().await.map_err(aborted)
    }

    async fn region_exists(&self, name: &str) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM regions WHERE name = $1)")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(unavailable)
    }

    async fn create_school(&self, school: &School) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO schools (id, name, region_name, admins) VALUES ($1, $2, $3, $4)")
            .bind(school.id)
            .bind(&school.name)
            .bind(&school.region_name)
            .bind(&school.admins)
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn find_school(&self, id: Uuid) -> Result<Option<School>, StoreError> {
        let row = sqlx::query_as::<_, (Uuid, String, String, Vec<Uuid>)>(
            "SELECT id, name, region_name, admins FROM schools WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;
        Ok(row.map(|(id, name, region_name, admins)| School {
            id,
            name,
            region_name,
            admins,
        }))
    }

    async fn find_schools(&self, ids: &[Uuid]) -> Result<Vec<School>, StoreError> {
        let rows = sqlx::query_as::<_, (Uuid, String, String, Vec<Uuid>)>(
            "SELECT id, name, region_name, admins FROM schools WHERE id = ANY($1)",
        )
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;
        Ok(rows
            .into_iter()
            .map(|(id, name, region_name, admins)| School {
                id,
                name,
                region_name,
                admins,
            })
            .collect())
    }

    async fn create_feed(&self, feed: &Feed) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO feeds (id, created_at, school_id, school_name, subject, content) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(feed.id)
        .bind(feed.created_at)
        .bind(feed.school.id)
        .bind(&feed.school.name)
        .bind(&feed.subject)
        .bind(&feed.content)
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;
        Ok(())
    }

    async fn find_feed(&self, id: Uuid) -> Result<Option<Feed>, StoreError> {
        let row = sqlx::query_as::<_, FeedRow>(&format!(
            "SELECT {FEED_COLUMNS} FROM feeds WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;
        Ok(row.map(Self::decode_feed))
    }

    async fn update_feed(
        &self,
        id: Uuid,
        created_at: DateTime<Utc>,
        patch: &FeedPatch,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE feeds SET subject = COALESCE($3, subject), content = COALESCE($4, content) \
             WHERE id = $1 AND created_at = $2",
        )
        .bind(id)
        .bind(created_at)
        .bind(&patch.subject)
        .bind(&patch.content)
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_feed(&self, id: Uuid, created_at: DateTime<Utc>) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM feeds WHERE id = $1 AND created_at = $2")
            .bind(id)
            .bind(created_at)
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(result.rows_affected() > 0)
    }

    async fn feeds_by_school(&self, school_id: Uuid) -> Result<Vec<Feed>, StoreError> {
        let rows = sqlx::query_as::<_, FeedRow>(&format!(
            "SELECT {FEED_COLUMNS} FROM feeds WHERE school_id = $1"
        ))
        .bind(school_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;
        Ok(rows.into_iter().map(Self::decode_feed).collect())
    }

    async fn feeds_in_window(
        &self,
        school_id: Uuid,
        from: DateTime<Utc>,
        until: Option<DateTime<Utc>>,
    ) -> Result<Vec<Feed>, StoreError> {
        let rows = sqlx::query_as::<_, FeedRow>(&format!(
            "SELECT {FEED_COLUMNS} FROM feeds \
             WHERE school_id = $1 AND created_at >= $2 \
             AND ($3::timestamptz IS NULL OR created_at < $3)"
        ))
        .bind(school_id)
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;
        Ok(rows.into_iter().map(Self::decode_feed).collect())
    }

    async fn snapshots_for_user(&self, user_id: Uuid) -> Result<Vec<FeedSnapshot>, StoreError> {
        let rows = sqlx::query_as::<_, (Uuid, DateTime<Utc>, serde_json::Value)>(
            "SELECT user_id, created_at, feeds FROM unsubscribed_feeds WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        rows.into_iter()
            .map(|(user_id, created_at, feeds)| {
                let feeds: Vec<Feed> = serde_json::from_value(feeds)
                    .map_err(|e| StoreError::Decode(format!("snapshot feeds: {e}")))?;
                Ok(FeedSnapshot {
                    user_id,
                    feeds,
                    created_at,
                })
            })
            .collect()
    }
}
