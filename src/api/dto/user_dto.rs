//! Sign-up and profile DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Role, UserProfile};

/// Request body for `POST /users/sign-up`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SignUpRequest {
    /// Login email; must be unique.
    pub email: String,
    /// Plaintext password, hashed before storage.
    pub password: String,
    /// Requested role.
    pub role: Role,
}

/// One active subscription entry.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubscriptionDto {
    /// School page id.
    pub school_id: Uuid,
    /// When the subscription started.
    pub subscribed_at: DateTime<Utc>,
}

/// Credential-free account view returned by sign-up, subscribe, and
/// unsubscribe.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    /// Account id.
    pub id: Uuid,
    /// Login email.
    pub email: String,
    /// Privilege level.
    pub role: Role,
    /// Active school subscriptions.
    pub subscriptions: Vec<SubscriptionDto>,
}

impl From<UserProfile> for ProfileResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            email: profile.email,
            role: profile.role,
            subscriptions: profile
                .subscriptions
                .into_iter()
                .map(|s| SubscriptionDto {
                    school_id: s.school_id,
                    subscribed_at: s.subscribed_at,
                })
                .collect(),
        }
    }
}
