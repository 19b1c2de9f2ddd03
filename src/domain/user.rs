//! User accounts, roles, and school subscriptions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Privilege level of an account.
///
/// Each role carries a numeric level; an endpoint that requires a minimum
/// role admits any caller whose level is greater or equal. Whether an
/// endpoint is public at all is decided by route construction (no auth
/// extractor), never by a role value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular student account: may subscribe and read feeds.
    Student,
    /// School administrator: may create pages and post feeds.
    Admin,
    /// Operator account with the highest level.
    SuperAdmin,
}

impl Role {
    /// Returns the numeric privilege level for threshold comparisons.
    #[must_use]
    pub const fn level(self) -> i16 {
        match self {
            Self::Student => 100,
            Self::Admin => 200,
            Self::SuperAdmin => 300,
        }
    }

    /// Reconstructs a role from its stored numeric level.
    #[must_use]
    pub const fn from_level(level: i16) -> Option<Self> {
        match level {
            100 => Some(Self::Student),
            200 => Some(Self::Admin),
            300 => Some(Self::SuperAdmin),
            _ => None,
        }
    }

    /// Returns `true` if this role meets the given minimum role.
    #[must_use]
    pub const fn satisfies(self, min: Self) -> bool {
        self.level() >= min.level()
    }
}

/// One active subscription: which school and since when.
///
/// `subscribed_at` is the start of the visibility window for that school's
/// feeds and later becomes the lower bound of the unsubscribe snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// School page being subscribed to.
    pub school_id: Uuid,
    /// When the subscription started.
    pub subscribed_at: DateTime<Utc>,
}

/// A stored user account.
///
/// Identity key is the pair (id, email). The subscription set holds at
/// most one entry per school id; this invariant is enforced by the
/// subscription service, not the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Generated account id (v4).
    pub id: Uuid,
    /// Login email, unique across accounts.
    pub email: String,
    /// Argon2 password hash. Never leaves the store/service boundary.
    pub password_hash: String,
    /// Privilege level.
    pub role: Role,
    /// Active school subscriptions.
    pub subscriptions: Vec<Subscription>,
}

impl User {
    /// Returns the subscription entry for the given school, if any.
    #[must_use]
    pub fn subscription(&self, school_id: Uuid) -> Option<&Subscription> {
        self.subscriptions.iter().find(|s| s.school_id == school_id)
    }

    /// Returns `true` if the user currently subscribes to the school.
    #[must_use]
    pub fn is_subscribed(&self, school_id: Uuid) -> bool {
        self.subscription(school_id).is_some()
    }

    /// Projects the account into its credential-free public shape.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            role: self.role,
            subscriptions: self.subscriptions.clone(),
        }
    }
}

/// Credential-stripped projection of a [`User`].
///
/// The only user shape that handlers may serialize; the password hash
/// field does not exist on this type.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    /// Account id.
    pub id: Uuid,
    /// Login email.
    pub email: String,
    /// Privilege level.
    pub role: Role,
    /// Active school subscriptions.
    pub subscriptions: Vec<Subscription>,
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn role_levels_are_ordered() {
        assert!(Role::Admin.satisfies(Role::Student));
        assert!(Role::SuperAdmin.satisfies(Role::Admin));
        assert!(!Role::Student.satisfies(Role::Admin));
        assert!(Role::Student.satisfies(Role::Student));
    }

    #[test]
    fn role_level_roundtrip() {
        for role in [Role::Student, Role::Admin, Role::SuperAdmin] {
            assert_eq!(Role::from_level(role.level()), Some(role));
        }
        assert_eq!(Role::from_level(150), None);
    }

    #[test]
    fn profile_has_no_credential() {
        let user = User {
            id: Uuid::new_v4(),
            email: "a@b.cd".to_string(),
            password_hash: "$argon2id$...".to_string(),
            role: Role::Student,
            subscriptions: vec![],
        };
        let json = serde_json::to_value(user.profile()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("password").is_none());
    }
}
