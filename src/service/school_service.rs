//! School page creation and lookup.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::School;
use crate::error::ApiError;
use crate::store::Store;

/// School page operations.
#[derive(Debug, Clone)]
pub struct SchoolService<S> {
    store: Arc<S>,
}

impl<S: Store> SchoolService<S> {
    /// Creates a new `SchoolService`.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Creates a school page with the creator as its first admin.
    ///
    /// # Errors
    ///
    /// [`ApiError::RegionNotFound`] if the region name is unknown, or a
    /// store error.
    pub async fn create_page(
        &self,
        creator: Uuid,
        name: String,
        region_name: String,
    ) -> Result<School, ApiError> {
        if !self.store.region_exists(&region_name).await? {
            return Err(ApiError::RegionNotFound(region_name));
        }

        let school = School::new(name, region_name, creator);
        self.store.create_school(&school).await?;

        tracing::info!(school_id = %school.id, name = %school.name, "school page created");
        Ok(school)
    }

    /// Looks up a school page by id.
    ///
    /// # Errors
    ///
    /// [`ApiError::SchoolNotFound`] or a store error.
    pub async fn find(&self, school_id: Uuid) -> Result<School, ApiError> {
        self.store
            .find_school(school_id)
            .await?
            .ok_or(ApiError::SchoolNotFound(school_id))
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn create_page_requires_known_region() {
        let store = Arc::new(MemoryStore::new());
        let service = SchoolService::new(Arc::clone(&store));

        let err = service
            .create_page(Uuid::new_v4(), "X High".to_string(), "Atlantis".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::RegionNotFound(_)));
    }

    #[tokio::test]
    async fn created_page_has_creator_as_admin() {
        let store = Arc::new(MemoryStore::new());
        store.add_region("Seoul").await;
        let service = SchoolService::new(Arc::clone(&store));

        let creator = Uuid::new_v4();
        let school = service
            .create_page(creator, "X High".to_string(), "Seoul".to_string())
            .await
            .unwrap();
        assert!(school.is_admin(creator));

        let found = service.find(school.id).await.unwrap();
        assert_eq!(found.name, "X High");
    }
}
