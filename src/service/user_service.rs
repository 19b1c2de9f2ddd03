//! Account sign-up and lookup.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Role, User, UserProfile};
use crate::error::ApiError;
use crate::service::auth_service;
use crate::store::Store;

/// User account operations.
#[derive(Debug, Clone)]
pub struct UserService<S> {
    store: Arc<S>,
}

impl<S: Store> UserService<S> {
    /// Creates a new `UserService`.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Registers a new account.
    ///
    /// The email must not be taken; the password is hashed before the row
    /// is written.
    ///
    /// # Errors
    ///
    /// [`ApiError::InvalidRequest`] for a malformed email,
    /// [`ApiError::EmailTaken`], or a store error.
    pub async fn sign_up(
        &self,
        email: String,
        password: &str,
        role: Role,
    ) -> Result<UserProfile, ApiError> {
        if !looks_like_email(&email) {
            return Err(ApiError::InvalidRequest("email is invalid".to_string()));
        }

        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(ApiError::EmailTaken(email));
        }

        let user = User {
            id: Uuid::new_v4(),
            email,
            password_hash: auth_service::hash_password(password)?,
            role,
            subscriptions: Vec::new(),
        };
        self.store.create_user(&user).await?;

        tracing::info!(user_id = %user.id, "user signed up");
        Ok(user.profile())
    }

    /// Loads the credential-free profile for an identity key.
    ///
    /// # Errors
    ///
    /// [`ApiError::UserNotFound`] or a store error.
    pub async fn profile(&self, user_id: Uuid, email: &str) -> Result<UserProfile, ApiError> {
        let user = self
            .store
            .get_user(user_id, email)
            .await?
            .ok_or(ApiError::UserNotFound)?;
        Ok(user.profile())
    }
}

/// Minimal shape check; full validation rules live at the HTTP edge.
fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn sign_up_rejects_duplicate_email() {
        let store = Arc::new(MemoryStore::new());
        let service = UserService::new(Arc::clone(&store));

        service
            .sign_up("a@example.com".to_string(), "pw", Role::Student)
            .await
            .unwrap();
        let err = service
            .sign_up("a@example.com".to_string(), "pw2", Role::Student)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::EmailTaken(_)));
    }

    #[tokio::test]
    async fn sign_up_rejects_malformed_email() {
        let store = Arc::new(MemoryStore::new());
        let service = UserService::new(Arc::clone(&store));

        for bad in ["", "no-at-sign", "a@", "a@nodot", "a@.com"] {
            let err = service
                .sign_up(bad.to_string(), "pw", Role::Student)
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::InvalidRequest(_)), "{bad}");
        }
    }

    #[tokio::test]
    async fn sign_up_stores_hash_not_password() {
        let store = Arc::new(MemoryStore::new());
        let service = UserService::new(Arc::clone(&store));

        let profile = service
            .sign_up("a@example.com".to_string(), "secret", Role::Admin)
            .await
            .unwrap();

        let stored = store
            .get_user(profile.id, "a@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_ne!(stored.password_hash, "secret");
        assert!(auth_service::verify_password("secret", &stored.password_hash));
    }
}
