//! Login and token-refresh DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::service::auth_service::TokenPair;

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Plaintext password; only ever compared against the stored hash.
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    /// A previously issued refresh token.
    pub refresh_token: String,
}

/// One issued token with its lifetime in seconds.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenDto {
    /// Encoded JWT.
    pub token: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
}

/// Response body for login and refresh.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenPairResponse {
    /// Short-lived access token.
    pub access_token: TokenDto,
    /// Longer-lived refresh token.
    pub refresh_token: TokenDto,
}

impl From<TokenPair> for TokenPairResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: TokenDto {
                token: pair.access_token.token,
                expires_in: pair.access_token.expires_in,
            },
            refresh_token: TokenDto {
                token: pair.refresh_token.token,
                expires_in: pair.refresh_token.expires_in,
            },
        }
    }
}
