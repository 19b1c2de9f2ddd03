//! Password hashing and JWT issuance/verification.
//!
//! Access and refresh tokens share one claims shape distinguished by a
//! `kind` claim; the refresh flow re-validates that the account still
//! exists before reissuing both tokens.

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Role;
use crate::error::ApiError;
use crate::store::Store;

/// Distinguishes the two token flavors inside the shared claims shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived credential attached to requests.
    Access,
    /// Longer-lived credential used only to reissue a pair.
    Refresh,
}

/// JWT claims carried by both token kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id.
    pub sub: Uuid,
    /// Account email, part of the identity key.
    pub email: String,
    /// Privilege level at issue time.
    pub role: Role,
    /// Token flavor.
    pub kind: TokenKind,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
}

/// One issued token with its lifetime.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    /// Encoded JWT.
    pub token: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
}

/// Access/refresh token pair returned by login and refresh.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: IssuedToken,
    /// Longer-lived refresh token.
    pub refresh_token: IssuedToken,
}

/// Login, refresh, and token verification.
#[derive(Clone)]
pub struct AuthService<S> {
    store: Arc<S>,
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
}

// Manual impl: the jsonwebtoken key types hold secret material and do
// not implement Debug.
impl<S> std::fmt::Debug for AuthService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .finish_non_exhaustive()
    }
}

impl<S: Store> AuthService<S> {
    /// Creates a new `AuthService` with an HS256 secret and token TTLs.
    #[must_use]
    pub fn new(store: Arc<S>, secret: &str, access_ttl_secs: u64, refresh_ttl_secs: u64) -> Self {
        Self {
            store,
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl_secs,
            refresh_ttl_secs,
        }
    }

    /// Verifies credentials and issues a token pair.
    ///
    /// # Errors
    ///
    /// [`ApiError::Unauthenticated`] on unknown email or wrong password,
    /// or a store error.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, ApiError> {
        let user = self
            .store
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| ApiError::Unauthenticated("invalid credentials".to_string()))?;

        if !verify_password(password, &user.password_hash) {
            return Err(ApiError::Unauthenticated("invalid credentials".to_string()));
        }

        tracing::info!(user_id = %user.id, "login");
        self.issue_pair(user.id, &user.email, user.role)
    }

    /// Validates a refresh token and reissues both tokens.
    ///
    /// # Errors
    ///
    /// [`ApiError::Unauthenticated`] if the token is invalid, not a
    /// refresh token, or the account no longer exists; or a store error.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        let claims = self.decode(refresh_token, TokenKind::Refresh)?;

        let user = self
            .store
            .find_user_by_id(claims.sub)
            .await?
            .ok_or_else(|| ApiError::Unauthenticated("user is invalid".to_string()))?;

        self.issue_pair(user.id, &user.email, user.role)
    }

    /// Verifies an access token and returns its claims.
    ///
    /// # Errors
    ///
    /// [`ApiError::Unauthenticated`] for a missing-kind, wrong-kind,
    /// expired, or otherwise invalid token.
    pub fn verify_access(&self, token: &str) -> Result<Claims, ApiError> {
        self.decode(token, TokenKind::Access)
    }

    fn decode(&self, token: &str, expected: TokenKind) -> Result<Claims, ApiError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| ApiError::Unauthenticated(e.to_string()))?;

        if data.claims.kind != expected {
            return Err(ApiError::Unauthenticated(
                "wrong token kind for this operation".to_string(),
            ));
        }
        Ok(data.claims)
    }

    fn issue_pair(&self, sub: Uuid, email: &str, role: Role) -> Result<TokenPair, ApiError> {
        Ok(TokenPair {
            access_token: self.issue(sub, email, role, TokenKind::Access, self.access_ttl_secs)?,
            refresh_token: self.issue(
                sub,
                email,
                role,
                TokenKind::Refresh,
                self.refresh_ttl_secs,
            )?,
        })
    }

    fn issue(
        &self,
        sub: Uuid,
        email: &str,
        role: Role,
        kind: TokenKind,
        ttl_secs: u64,
    ) -> Result<IssuedToken, ApiError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub,
            email: email.to_string(),
            role,
            kind,
            iat: now,
            exp: now.saturating_add(i64::try_from(ttl_secs).unwrap_or(i64::MAX)),
        };
        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("token encoding: {e}")))?;
        Ok(IssuedToken {
            token,
            expires_in: ttl_secs,
        })
    }
}

/// Hashes a password with Argon2id and a fresh random salt.
///
/// # Errors
///
/// [`ApiError::Internal`] if hashing fails.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing: {e}")))
}

/// Verifies a password against a stored hash. Malformed hashes verify as
/// `false`, never as an error.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
