//! Session token authentication extractor.
//!
//! Validates the Bearer token in the Authorization header and exposes the
//! authenticated user's id, workflow role, and customer-company scope.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use domain::models::{Actor, UserRole};
use shared::session::SessionKeys;

use crate::app::AppState;
use crate::config::JwtAuthConfig;
use crate::error::ApiError;

/// Authenticated user information from the session token.
#[derive(Debug, Clone)]
pub struct UserAuth {
    /// User ID from the subject claim.
    pub user_id: Uuid,
    /// Workflow role from the role claim.
    pub role: UserRole,
    /// Customer-company scope, present only for CUSTOMER sessions.
    pub customer_company_id: Option<Uuid>,
}

impl UserAuth {
    /// Builds the domain actor for lifecycle operations.
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.user_id,
            role: self.role,
            customer_company_id: self.customer_company_id,
        }
    }

    /// Creates session keys from the server configuration.
    pub fn create_session_keys(config: &JwtAuthConfig) -> Result<SessionKeys, anyhow::Error> {
        let mut keys = SessionKeys::new(
            &config.private_key,
            &config.public_key,
            config.session_expiry_secs,
        )?;
        keys.leeway_secs = config.leeway_secs;
        Ok(keys)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for UserAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Check if auth info was already inserted by upstream middleware
        if let Some(auth) = parts.extensions.get::<UserAuth>() {
            return Ok(auth.clone());
        }

        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

        if !auth_header.starts_with("Bearer ") {
            return Err(ApiError::Unauthorized(
                "Invalid Authorization header format".to_string(),
            ));
        }

        let token = &auth_header[7..];

        let keys = Self::create_session_keys(&state.config.jwt).map_err(ApiError::Internal)?;

        let claims = keys
            .validate(token)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

        let user_id = SessionKeys::user_id(&claims)
            .map_err(|_| ApiError::Unauthorized("Invalid token subject".to_string()))?;

        let role: UserRole = claims
            .role
            .parse()
            .map_err(|_| ApiError::Unauthorized("Unknown role in token".to_string()))?;

        // CUSTOMER sessions carry their company scope; staff sessions never do.
        let customer_company_id = match role {
            UserRole::Customer => Some(claims.company.ok_or_else(|| {
                ApiError::Unauthorized("Customer session missing company scope".to_string())
            })?),
            _ => None,
        };

        Ok(UserAuth {
            user_id,
            role,
            customer_company_id,
        })
    }
}
