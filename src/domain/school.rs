//! School pages: tenant-like resources owning a feed and an admin set.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A school page.
///
/// The admin set is non-empty from creation onwards: the creator is
/// auto-added and there is no operation that removes admins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct School {
    /// Generated page id (v4).
    pub id: Uuid,
    /// School name.
    pub name: String,
    /// Region the school belongs to; must match a known region.
    pub region_name: String,
    /// User ids allowed to manage this page.
    pub admins: Vec<Uuid>,
}

impl School {
    /// Creates a page with the creator as sole admin.
    #[must_use]
    pub fn new(name: String, region_name: String, creator: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            region_name,
            admins: vec![creator],
        }
    }

    /// Returns `true` if the given user may manage this page.
    #[must_use]
    pub fn is_admin(&self, user_id: Uuid) -> bool {
        self.admins.contains(&user_id)
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn creator_is_sole_admin() {
        let creator = Uuid::new_v4();
        let school = School::new("Haengbok High".to_string(), "Seoul".to_string(), creator);
        assert!(school.is_admin(creator));
        assert_eq!(school.admins.len(), 1);
        assert!(!school.is_admin(Uuid::new_v4()));
    }
}
