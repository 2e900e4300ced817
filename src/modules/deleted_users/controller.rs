use axum::{Json, extract::State};
use tracing::instrument;
use userhub_core::AppError;
use userhub_models::{DeletedUser, DeletedUserFilterParams, MessageResponse, PurgeDeletedUserDto};

use crate::docs::ErrorResponse;
use crate::state::AppState;
use crate::validator::{ValidatedJson, ValidatedQuery};

/// List soft-deleted users (admin only)
#[utoipa::path(
    get,
    path = "/deleted-users",
    params(DeletedUserFilterParams),
    responses(
        (status = 200, description = "Deleted users, newest deletion first", body = Vec<DeletedUser>),
        (status = 400, description = "Invalid filters", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Deleted Users"
)]
#[instrument(skip_all)]
pub async fn get_deleted_users(
    State(state): State<AppState>,
    ValidatedQuery(filters): ValidatedQuery<DeletedUserFilterParams>,
) -> Result<Json<Vec<DeletedUser>>, AppError> {
    let records = state.deleted_users.find_all(filters).await?;
    Ok(Json(records))
}

/// Permanently delete a soft-deleted user (admin only)
#[utoipa::path(
    delete,
    path = "/deleted-users",
    request_body = PurgeDeletedUserDto,
    responses(
        (status = 200, description = "Record purged", body = MessageResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 404, description = "Deleted user not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Deleted Users"
)]
#[instrument(skip_all, fields(deleted_user.id = %dto.id))]
pub async fn purge_deleted_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<PurgeDeletedUserDto>,
) -> Result<Json<MessageResponse>, AppError> {
    state.deleted_users.delete(dto.id).await?;
    Ok(Json(MessageResponse::new("User deleted")))
}
