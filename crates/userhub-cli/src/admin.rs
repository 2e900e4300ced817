//! Admin account bootstrap and token issuance.
//!
//! The public sign-up endpoint never grants the `admin` role, so the first
//! administrator has to be created here.

use sqlx::PgPool;
use userhub_auth::create_access_token;
use userhub_config::JwtConfig;
use userhub_core::{errors::field_messages, hash_password};
use userhub_models::{CreateUserDto, UserId, UserRole};
use validator::Validate;

use crate::CliError;

/// Input for [`create_admin`]. Checked with the same rules as sign-up.
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl NewAdmin {
    /// Trims names and email, then runs the sign-up validation rules.
    pub fn validated(self) -> Result<CreateUserDto, CliError> {
        let dto = CreateUserDto {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password,
        };

        dto.validate()
            .map_err(|e| field_messages(&e).join("; "))?;

        Ok(dto)
    }
}

/// Inserts an `admin` user and returns its id.
///
/// Fails if the email is already registered.
pub async fn create_admin(db: &PgPool, admin: NewAdmin) -> Result<UserId, CliError> {
    let dto = admin.validated()?;

    let hashed_password =
        hash_password(&dto.password).map_err(|e| format!("Failed to hash password: {}", e.error))?;

    let user_id = sqlx::query_scalar::<_, UserId>(
        "INSERT INTO users (first_name, last_name, email, password, role)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (email) DO NOTHING
         RETURNING id",
    )
    .bind(&dto.first_name)
    .bind(&dto.last_name)
    .bind(dto.normalized_email())
    .bind(&hashed_password)
    .bind(UserRole::Admin)
    .fetch_optional(db)
    .await?;

    user_id.ok_or_else(|| "User with this email already exists".into())
}

/// Mints an access token for an existing user, embedding their current role.
pub async fn issue_token(
    db: &PgPool,
    user_id: UserId,
    jwt_config: &JwtConfig,
) -> Result<String, CliError> {
    let role = sqlx::query_scalar::<_, UserRole>("SELECT role FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| format!("User {} not found", user_id))?;

    create_access_token(user_id.into_inner(), role.as_str(), jwt_config)
        .map_err(|e| format!("Failed to create token: {}", e.error).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin(email: &str, password: &str) -> NewAdmin {
        NewAdmin {
            first_name: " Grace ".to_string(),
            last_name: "Hopper".to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_validated_trims_fields() {
        let dto = admin(" grace@navy.mil ", "cobol-1959").validated().unwrap();
        assert_eq!(dto.first_name, "Grace");
        assert_eq!(dto.email, "grace@navy.mil");
    }

    #[test]
    fn test_validated_reports_bad_fields() {
        let err = admin("not-an-email", "short").validated().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("email"));
        assert!(message.contains("password"));
    }
}
