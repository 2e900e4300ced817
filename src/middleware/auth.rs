use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use userhub_auth::{Claims, verify_token};
use userhub_core::AppError;
use userhub_models::{UserId, UserRole};

use crate::middleware::role::parse_role_from_string;
use crate::state::AppState;

/// Extractor that validates the bearer JWT and provides the caller's claims.
///
/// The verified identity is cached in request extensions, so a route guarded
/// by both a role layer and a handler extractor verifies the token once.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// The subject claim as a user id.
    pub fn user_id(&self) -> Result<UserId, AppError> {
        self.0
            .sub
            .parse::<UserId>()
            .map_err(|_| AppError::unauthorized("Invalid user ID in token"))
    }

    pub fn role(&self) -> Result<UserRole, AppError> {
        parse_role_from_string(&self.0.role)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role(), Ok(UserRole::Admin))
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(auth_user) = parts.extensions.get::<AuthUser>() {
            return Ok(auth_user.clone());
        }

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))?;

        let auth_user = AuthUser(verify_token(token.trim(), &state.jwt_config)?);
        auth_user.user_id()?;

        parts.extensions.insert(auth_user.clone());

        Ok(auth_user)
    }
}
