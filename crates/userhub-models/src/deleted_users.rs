//! Soft-deleted user records.
//!
//! A row lands in `deleted_users` when a live user is deleted; purging it
//! removes it for good.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use userhub_core::PaginationParams;
use userhub_core::serde::{optional_from_str, trimmed_optional_string};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{DeletedUserId, UserId, validate_deleted_user_id, validate_user_id};
use crate::users::UserRole;

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct DeletedUser {
    pub id: DeletedUserId,
    /// ID the user had before deletion
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: UserRole,
    pub profile_photo: Option<String>,
    /// When the original account was created
    pub created_at: DateTime<Utc>,
    pub deleted_at: DateTime<Utc>,
}

/// Query parameters for listing deleted users.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeletedUserFilterParams {
    /// Partial, case-insensitive match on email
    #[serde(default, deserialize_with = "trimmed_optional_string")]
    #[validate(length(max = 255))]
    pub email: Option<String>,
    /// Exact match on the original user ID
    #[serde(default, deserialize_with = "optional_from_str")]
    #[validate(custom(function = "validate_user_id"))]
    #[schema(value_type = Option<i32>)]
    #[param(value_type = Option<i32>)]
    pub user_id: Option<UserId>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// Body of `DELETE /deleted-users`.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PurgeDeletedUserDto {
    #[validate(custom(function = "validate_deleted_user_id"))]
    #[schema(value_type = i32)]
    pub id: DeletedUserId,
}
