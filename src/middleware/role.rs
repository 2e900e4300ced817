//! Role-based authorization for Axum
//!
//! Two checks exist:
//!
//! 1. **Admin only**: as a router layer ([`require_admin`]) or as a handler
//!    extractor ([`RequireAdmin`]).
//! 2. **Self or admin**: the request names a target user (or omits it to
//!    mean the caller). [`resolve_target_user`] turns that into the single id
//!    the handler acts on; [`SelfOrAdminQuery`] and [`SelfOrAdminBody`] run it
//!    against the query string or the JSON body.

use anyhow::anyhow;
use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Query, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use serde::de::DeserializeOwned;
use userhub_core::AppError;
use userhub_models::{TargetUserBody, TargetUserQuery, UserId, UserRole};

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::validate_value;

/// Router layer rejecting every request whose caller is not an admin.
///
/// ```rust,ignore
/// use axum::{Router, middleware};
/// use crate::middleware::role::require_admin;
///
/// let admin_routes = Router::new()
///     .route("/deleted-users", get(list_handler))
///     .layer(middleware::from_fn_with_state(state.clone(), require_admin));
/// ```
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;
    check_role(&auth_user, UserRole::Admin)?;

    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Extractor for admin-only handlers. Carries the authenticated admin.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_user = AuthUser::from_request_parts(parts, state).await?;
        check_role(&auth_user, UserRole::Admin)?;

        Ok(RequireAdmin(auth_user))
    }
}

pub fn check_role(auth_user: &AuthUser, required_role: UserRole) -> Result<(), AppError> {
    let user_role = auth_user.role()?;

    if user_role != required_role {
        return Err(AppError::forbidden(format!(
            "Access denied. Required role: {}",
            required_role
        )));
    }

    Ok(())
}

/// Parses a role claim. Unknown names are a 403.
pub fn parse_role_from_string(role_str: &str) -> Result<UserRole, AppError> {
    role_str
        .parse::<UserRole>()
        .map_err(|_| AppError::forbidden(format!("Invalid role: {}", role_str)))
}

/// Resolves which user a self-or-admin request acts on.
///
/// - no id requested: the caller
/// - the caller's own id: the caller
/// - another id: allowed for admins only, otherwise 403
pub fn resolve_target_user(
    auth_user: &AuthUser,
    requested: Option<UserId>,
) -> Result<UserId, AppError> {
    let caller = auth_user.user_id()?;

    match requested {
        None => Ok(caller),
        Some(id) if id == caller => Ok(caller),
        Some(id) if auth_user.is_admin() => Ok(id),
        Some(_) => Err(AppError::forbidden(
            "Access denied. You can only act on your own account.",
        )),
    }
}

/// Self-or-admin guard reading the target from the `id` query parameter.
#[derive(Debug, Clone)]
pub struct SelfOrAdminQuery {
    pub auth_user: AuthUser,
    pub target: UserId,
}

impl FromRequestParts<AppState> for SelfOrAdminQuery {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_user = AuthUser::from_request_parts(parts, state).await?;

        let Query(query) = Query::<TargetUserQuery>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                AppError::bad_request(anyhow!("Invalid query parameters: {}", e.body_text()))
            })?;
        let query = validate_value(query)?;

        let target = resolve_target_user(&auth_user, query.id)?;
        Ok(SelfOrAdminQuery { auth_user, target })
    }
}

/// Self-or-admin guard reading the target from an optional JSON body
/// `{"id": ...}`. An empty body targets the caller.
#[derive(Debug, Clone)]
pub struct SelfOrAdminBody {
    pub auth_user: AuthUser,
    pub target: UserId,
}

impl FromRequest<AppState> for SelfOrAdminBody {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();
        let auth_user = AuthUser::from_request_parts(&mut parts, state).await?;

        let bytes = Bytes::from_request(Request::from_parts(parts, body), state)
            .await
            .map_err(|e| {
                AppError::bad_request(anyhow!("Invalid request body: {}", e.body_text()))
            })?;
        let body: TargetUserBody = validate_value(parse_optional_json(&bytes)?)?;

        let target = resolve_target_user(&auth_user, body.id)?;
        Ok(SelfOrAdminBody { auth_user, target })
    }
}

fn parse_optional_json<T: DeserializeOwned + Default>(bytes: &[u8]) -> Result<T, AppError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    serde_json::from_slice(bytes)
        .map_err(|e| AppError::bad_request(anyhow!("Invalid request body: {}", e)))
}
