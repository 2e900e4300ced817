use anyhow::anyhow;
use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;
use userhub_core::AppError;
use userhub_models::{
    CreateUserDto, GetUserParams, MessageResponse, ProfileImageResponse, UpdateUserDto, User,
    UserFilterParams,
};

use crate::docs::{ErrorResponse, ProfileImageForm};
use crate::middleware::auth::AuthUser;
use crate::middleware::role::{RequireAdmin, SelfOrAdminBody, SelfOrAdminQuery, resolve_target_user};
use crate::middleware::upload::ProfileImageUpload;
use crate::state::AppState;
use crate::validator::{ValidatedJson, ValidatedPath, ValidatedQuery};

use super::service::profile_photo_key;

/// Register a new user
///
/// Open to anonymous callers. New accounts always get the `user` role.
#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created successfully", body = User),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Users"
)]
#[instrument(skip_all, fields(user.email = %dto.email))]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateUserDto>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = state.users.create(dto).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// List users (admin only)
#[utoipa::path(
    get,
    path = "/users",
    params(UserFilterParams),
    responses(
        (status = 200, description = "List of users", body = Vec<User>),
        (status = 400, description = "Invalid filters", body = ErrorResponse),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip_all)]
pub async fn get_users(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    ValidatedQuery(filters): ValidatedQuery<UserFilterParams>,
) -> Result<Json<Vec<User>>, AppError> {
    let users = state.users.find_all(filters).await?;
    Ok(Json(users))
}

/// Get a user by ID (admin only)
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(GetUserParams),
    responses(
        (status = 200, description = "User details", body = User),
        (status = 400, description = "Invalid ID", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip_all, fields(user.id = %params.id))]
pub async fn get_user(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    ValidatedPath(params): ValidatedPath<GetUserParams>,
) -> Result<Json<User>, AppError> {
    let user = state.users.find_by_id(params.id).await?;
    Ok(Json(user))
}

/// Update a user
///
/// Updates the caller unless an admin names another user with `id`. Only
/// admins may change `role`.
#[utoipa::path(
    patch,
    path = "/users",
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - not your account or role change by non-admin", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip_all, fields(caller.id = %auth_user.0.sub))]
pub async fn update_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<UpdateUserDto>,
) -> Result<Json<User>, AppError> {
    let target = resolve_target_user(&auth_user, dto.id)?;

    if dto.role.is_some() && !auth_user.is_admin() {
        return Err(AppError::forbidden(
            "Access denied. Only administrators can change roles.",
        ));
    }

    let user = state.users.update(target, dto).await?;
    Ok(Json(user))
}

/// Delete a user
///
/// Soft delete: the account moves to the deleted-users store. Targets the
/// caller unless an admin passes `?id=`.
#[utoipa::path(
    delete,
    path = "/users",
    params(userhub_models::TargetUserQuery),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - not your account", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip_all, fields(user.id = %guard.target))]
pub async fn delete_user(
    State(state): State<AppState>,
    guard: SelfOrAdminQuery,
) -> Result<Json<MessageResponse>, AppError> {
    state.users.delete(guard.target).await?;
    Ok(Json(MessageResponse::new("Deleted")))
}

/// Delete a profile image
///
/// Targets the caller unless an admin sends `{"id": ...}`. The body may be
/// empty.
#[utoipa::path(
    delete,
    path = "/users/delete_profile_image",
    request_body(content = userhub_models::TargetUserBody, description = "Optional; an empty body targets the caller", content_type = "application/json"),
    responses(
        (status = 200, description = "Image deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - not your account", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip_all, fields(user.id = %guard.target))]
pub async fn delete_profile_image(
    State(state): State<AppState>,
    guard: SelfOrAdminBody,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.users.delete_profile_photo(guard.target).await? {
        return Err(AppError::internal(anyhow!("Profile image was not deleted")));
    }
    Ok(Json(MessageResponse::new("Image deleted correctly")))
}

/// Upload a profile image
///
/// Multipart form with the file in an `image` field. Always targets the
/// caller. The image is stored as PNG.
#[utoipa::path(
    post,
    path = "/users/upload_profile_image",
    request_body(content = ProfileImageForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image stored", body = ProfileImageResponse),
        (status = 400, description = "Missing, oversized or invalid image", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip_all, fields(user.id = %auth_user.0.sub))]
pub async fn upload_profile_image(
    State(state): State<AppState>,
    auth_user: AuthUser,
    upload: ProfileImageUpload,
) -> Result<(StatusCode, Json<ProfileImageResponse>), AppError> {
    let user_id = auth_user.user_id()?;
    let file = upload.into_image()?;

    if !state.users.load_profile_image(file, user_id).await? {
        return Err(AppError::internal(anyhow!("Profile image was not stored")));
    }

    let image = state.public_url(&profile_photo_key(user_id))?;
    Ok((
        StatusCode::CREATED,
        Json(ProfileImageResponse {
            message: "Image loaded correctly".to_string(),
            image,
        }),
    ))
}
