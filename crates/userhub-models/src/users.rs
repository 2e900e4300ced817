//! User data models and DTOs.
//!
//! # Core Types
//!
//! - [`User`] - User entity as returned by the API (never includes the password hash)
//! - [`UserRole`] - Authorization tier stored on the user and embedded in tokens
//!
//! # Request DTOs
//!
//! - [`CreateUserDto`] - Public sign-up payload
//! - [`UpdateUserDto`] - Partial update, optionally targeting another user (admins)
//! - [`UserFilterParams`] - Query parameters for listing users
//! - [`GetUserParams`] - Path parameters for fetching one user
//! - [`TargetUserQuery`] / [`TargetUserBody`] - Optional explicit target id

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use userhub_core::PaginationParams;
use userhub_core::serde::{optional_from_str, trimmed_optional_string, trimmed_string};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::ids::{UserId, validate_user_id};

/// Authorization tier. New accounts are always `user`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    User,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "user" => Ok(UserRole::User),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// A user account.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: UserRole,
    /// Storage key of the profile photo, e.g. `profile_photos/42.png`
    pub profile_photo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// bcrypt only reads the first 72 bytes of a password.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// `#[validate(custom)]` hook bounding the encoded length of a password.
pub fn validate_password_bytes(password: &str) -> Result<(), ValidationError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::new("length").with_message(
            format!("must be at most {} bytes", MAX_PASSWORD_BYTES).into(),
        ));
    }
    Ok(())
}

/// Public sign-up payload. The role is not accepted here.
#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateUserDto {
    #[serde(deserialize_with = "trimmed_string")]
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub first_name: String,
    #[serde(deserialize_with = "trimmed_string")]
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub last_name: String,
    #[serde(deserialize_with = "trimmed_string")]
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(
        length(min = 8, message = "must be at least 8 characters"),
        custom(function = "validate_password_bytes")
    )]
    pub password: String,
}

impl CreateUserDto {
    /// Emails are stored lowercased so uniqueness is case-insensitive.
    pub fn normalized_email(&self) -> String {
        self.email.to_lowercase()
    }
}

/// Partial update. Only provided fields change.
///
/// `id` selects another user and `role` changes the tier; both require an
/// admin caller.
#[derive(Deserialize, Debug, Clone, Default, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserDto {
    #[serde(default, deserialize_with = "optional_from_str")]
    #[validate(custom(function = "validate_user_id"))]
    #[schema(value_type = Option<i32>)]
    pub id: Option<UserId>,
    #[serde(default, deserialize_with = "trimmed_optional_string")]
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "trimmed_optional_string")]
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "trimmed_optional_string")]
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(
        length(min = 8, message = "must be at least 8 characters"),
        custom(function = "validate_password_bytes")
    )]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
}

impl UpdateUserDto {
    pub fn has_changes(&self) -> bool {
        self.first_name.is_some()
            || self.last_name.is_some()
            || self.email.is_some()
            || self.password.is_some()
            || self.role.is_some()
    }
}

/// Query parameters for listing users. All filters are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserFilterParams {
    /// Partial, case-insensitive match
    #[serde(default, deserialize_with = "trimmed_optional_string")]
    #[validate(length(max = 255))]
    pub email: Option<String>,
    /// Partial, case-insensitive match
    #[serde(default, deserialize_with = "trimmed_optional_string")]
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    /// Partial, case-insensitive match
    #[serde(default, deserialize_with = "trimmed_optional_string")]
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    /// Exact match
    #[serde(default, deserialize_with = "optional_from_str")]
    pub role: Option<UserRole>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// Path parameters for `GET /users/{id}`.
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct GetUserParams {
    /// User ID
    #[validate(custom(function = "validate_user_id"))]
    #[param(value_type = i32)]
    pub id: UserId,
}

/// Query string selecting the target of a self-or-admin operation.
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TargetUserQuery {
    /// Target user; defaults to the caller. Only admins may name another user.
    #[serde(default, deserialize_with = "optional_from_str")]
    #[validate(custom(function = "validate_user_id"))]
    #[param(value_type = Option<i32>)]
    pub id: Option<UserId>,
}

/// JSON body selecting the target of a self-or-admin operation.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct TargetUserBody {
    /// Target user; defaults to the caller. Only admins may name another user.
    #[serde(default, deserialize_with = "optional_from_str")]
    #[validate(custom(function = "validate_user_id"))]
    #[schema(value_type = Option<i32>)]
    pub id: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response to a successful profile image upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProfileImageResponse {
    pub message: String,
    /// Public URL of the stored image
    pub image: String,
}
