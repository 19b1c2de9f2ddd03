//! Caller identity extractor for protected routes.
//!
//! Public endpoints simply do not take this extractor; there is no
//! "public" role value.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::domain::Role;
use crate::error::ApiError;

/// Verified caller identity, extracted from the `Authorization: Bearer`
/// access token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Account id.
    pub id: Uuid,
    /// Account email, the other half of the identity key.
    pub email: String,
    /// Privilege level at token issue time.
    pub role: Role,
}

impl AuthUser {
    /// Checks the role threshold declared by an endpoint.
    ///
    /// Independent of resource-level admin checks: an endpoint may pass
    /// this and still fail `School::is_admin`.
    ///
    /// # Errors
    ///
    /// [`ApiError::PermissionDenied`] if the caller's level is below the
    /// minimum.
    pub fn require_role(&self, min: Role) -> Result<(), ApiError> {
        if self.role.satisfies(min) {
            Ok(())
        } else {
            Err(ApiError::PermissionDenied(
                "insufficient role level".to_string(),
            ))
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthenticated("missing authorization header".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthenticated("expected bearer token".to_string()))?;

        let claims = state.auth.verify_access(token)?;
        Ok(Self {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn role_threshold_is_independent_of_identity() {
        let student = AuthUser {
            id: Uuid::new_v4(),
            email: "s@example.com".to_string(),
            role: Role::Student,
        };
        assert!(student.require_role(Role::Student).is_ok());
        assert!(matches!(
            student.require_role(Role::Admin),
            Err(ApiError::PermissionDenied(_))
        ));

        let admin = AuthUser {
            role: Role::Admin,
            ..student
        };
        assert!(admin.require_role(Role::Student).is_ok());
        assert!(admin.require_role(Role::Admin).is_ok());
    }
}
