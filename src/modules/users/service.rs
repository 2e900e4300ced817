use std::io::Cursor;
use std::sync::Arc;

use anyhow::anyhow;
use axum::body::Bytes;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, error, info, instrument, warn};
use userhub_core::{AppError, FileStorage, hash_password_async};
use userhub_models::{CreateUserDto, UpdateUserDto, User, UserFilterParams, UserId, UserRole};

use crate::metrics;
use crate::middleware::upload::UploadedFile;
use crate::modules::{ServiceFuture, contains_pattern};

const USER_COLUMNS: &str =
    "id, first_name, last_name, email, role, profile_photo, created_at, updated_at";

/// Directory of live profile photos. The only part of storage served publicly.
pub const PROFILE_PHOTO_DIR: &str = "profile_photos";

/// Photos of soft-deleted users, kept until the archived record is purged.
pub const ARCHIVED_PHOTO_DIR: &str = "archived_photos";

/// Storage key of a user's profile photo. Uploads always overwrite it.
pub fn profile_photo_key(user_id: UserId) -> String {
    format!("{}/{}.png", PROFILE_PHOTO_DIR, user_id)
}

/// Where a soft delete moves the user's photo.
pub fn archived_photo_key(user_id: UserId) -> String {
    format!("{}/{}.png", ARCHIVED_PHOTO_DIR, user_id)
}

/// User account operations used by the `/users` handlers.
pub trait UserService: Send + Sync {
    /// Registers a user with the default role. 409 if the email is taken.
    fn create(&self, dto: CreateUserDto) -> ServiceFuture<'_, User>;

    fn find_all(&self, filters: UserFilterParams) -> ServiceFuture<'_, Vec<User>>;

    fn find_by_id(&self, id: UserId) -> ServiceFuture<'_, User>;

    /// Applies the provided fields only.
    fn update(&self, id: UserId, dto: UpdateUserDto) -> ServiceFuture<'_, User>;

    /// Soft delete: the row moves to `deleted_users` and the photo, if any,
    /// out of the public directory.
    fn delete(&self, id: UserId) -> ServiceFuture<'_, ()>;

    /// Removes the stored photo and clears the column. No photo is not an error.
    fn delete_profile_photo(&self, id: UserId) -> ServiceFuture<'_, bool>;

    /// Stores `file` as the user's photo, re-encoded as PNG.
    fn load_profile_image(&self, file: UploadedFile, id: UserId) -> ServiceFuture<'_, bool>;
}

pub struct PgUserService {
    db: PgPool,
    file_storage: Arc<dyn FileStorage>,
}

impl PgUserService {
    pub fn new(db: PgPool, file_storage: Arc<dyn FileStorage>) -> Self {
        Self { db, file_storage }
    }

    #[instrument(skip(self, dto), fields(user.email = %dto.email, db.operation = "INSERT", db.table = "users"))]
    async fn create_user(&self, dto: CreateUserDto) -> Result<User, AppError> {
        let email = dto.normalized_email();
        let hashed_password = hash_password_async(dto.password.clone()).await?;
        let role = UserRole::default();

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (first_name, last_name, email, password, role)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&email)
        .bind(&hashed_password)
        .bind(role)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, &email))?;

        metrics::track_user_created(role.as_str());
        info!(user.id = %user.id, "User created");
        Ok(user)
    }

    #[instrument(skip(self), fields(db.operation = "SELECT", db.table = "users"))]
    async fn get_users(&self, filters: UserFilterParams) -> Result<Vec<User>, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM users WHERE 1=1", USER_COLUMNS));

        if let Some(email) = &filters.email {
            query.push(" AND email ILIKE ").push_bind(contains_pattern(email));
        }
        if let Some(first_name) = &filters.first_name {
            query
                .push(" AND first_name ILIKE ")
                .push_bind(contains_pattern(first_name));
        }
        if let Some(last_name) = &filters.last_name {
            query
                .push(" AND last_name ILIKE ")
                .push_bind(contains_pattern(last_name));
        }
        if let Some(role) = filters.role {
            query.push(" AND role = ").push_bind(role);
        }

        query
            .push(" ORDER BY id LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let users = query
            .build_query_as::<User>()
            .fetch_all(&self.db)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error fetching users");
                AppError::from(e)
            })?;

        debug!(returned = users.len(), limit, offset, "Users fetched");
        Ok(users)
    }

    #[instrument(skip(self), fields(user.id = %id, db.operation = "SELECT", db.table = "users"))]
    async fn get_user(&self, id: UserId) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| user_not_found(id))
    }

    #[instrument(skip(self, dto), fields(user.id = %id, db.operation = "UPDATE", db.table = "users"))]
    async fn update_user(&self, id: UserId, dto: UpdateUserDto) -> Result<User, AppError> {
        if !dto.has_changes() {
            debug!("No fields to update");
            return self.get_user(id).await;
        }

        let email = dto.email.as_deref().map(str::to_lowercase);
        let hashed_password = match dto.password.clone() {
            Some(password) => Some(hash_password_async(password).await?),
            None => None,
        };

        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE users SET ");
        {
            let mut set = query.separated(", ");
            if let Some(first_name) = dto.first_name {
                set.push("first_name = ").push_bind_unseparated(first_name);
            }
            if let Some(last_name) = dto.last_name {
                set.push("last_name = ").push_bind_unseparated(last_name);
            }
            if let Some(email) = email.clone() {
                set.push("email = ").push_bind_unseparated(email);
            }
            if let Some(password) = hashed_password {
                set.push("password = ").push_bind_unseparated(password);
            }
            if let Some(role) = dto.role {
                set.push("role = ").push_bind_unseparated(role);
            }
            set.push("updated_at = NOW()");
        }
        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {}", USER_COLUMNS));

        let user = query
            .build_query_as::<User>()
            .fetch_optional(&self.db)
            .await
            .map_err(|e| map_unique_violation(e, email.as_deref().unwrap_or_default()))?
            .ok_or_else(|| user_not_found(id))?;

        info!("User updated");
        Ok(user)
    }

    #[instrument(skip(self), fields(user.id = %id, db.operation = "DELETE", db.table = "users"))]
    async fn soft_delete_user(&self, id: UserId) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;

        let photo = sqlx::query_scalar::<_, Option<String>>(
            "SELECT profile_photo FROM users WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| user_not_found(id))?;
        let archived = photo.as_ref().map(|_| archived_photo_key(id));

        sqlx::query(
            "INSERT INTO deleted_users
                 (user_id, first_name, last_name, email, password, role, profile_photo, created_at)
             SELECT id, first_name, last_name, email, password, role, $2, created_at
             FROM users
             WHERE id = $1",
        )
        .bind(id)
        .bind(archived.as_deref())
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        // The photo leaves the public directory before the row is committed
        let moved = match (&photo, &archived) {
            (Some(from), Some(to)) => {
                self.file_storage.rename(from, to).await.map_err(|e| {
                    error!(storage.key = %from, error = %e, "Failed to archive profile photo");
                    AppError::internal(e)
                })?;
                Some((from, to))
            }
            _ => None,
        };

        if let Err(e) = tx.commit().await {
            if let Some((from, to)) = moved
                && let Err(restore) = self.file_storage.rename(to, from).await
            {
                warn!(storage.key = %to, error = %restore, "Failed to restore profile photo");
            }
            return Err(e.into());
        }

        metrics::track_user_soft_deleted();
        info!(storage.key = ?archived, "User moved to deleted_users");
        Ok(())
    }

    #[instrument(skip(self), fields(user.id = %id, db.operation = "UPDATE", db.table = "users"))]
    async fn remove_profile_photo(&self, id: UserId) -> Result<bool, AppError> {
        let photo = sqlx::query_scalar::<_, Option<String>>(
            "SELECT profile_photo FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| user_not_found(id))?;

        let Some(key) = photo else {
            debug!("User has no profile photo");
            return Ok(true);
        };

        self.file_storage.delete(&key).await.map_err(|e| {
            error!(storage.key = %key, error = %e, "Failed to delete profile photo");
            AppError::internal(e)
        })?;

        sqlx::query("UPDATE users SET profile_photo = NULL, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        info!(storage.key = %key, "Profile photo deleted");
        Ok(true)
    }

    #[instrument(
        skip(self, file),
        fields(user.id = %id, file.size = file.size(), file.content_type = %file.content_type)
    )]
    async fn store_profile_image(&self, file: UploadedFile, id: UserId) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, i32>("SELECT 1 FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .is_some();
        if !exists {
            return Err(user_not_found(id));
        }

        let png = tokio::task::spawn_blocking(move || encode_as_png(&file.bytes))
            .await
            .map_err(AppError::internal)??;

        let key = profile_photo_key(id);
        self.file_storage.save(&key, &png).await.map_err(|e| {
            error!(storage.key = %key, error = %e, "Failed to save profile photo");
            AppError::internal(e)
        })?;

        sqlx::query("UPDATE users SET profile_photo = $1, updated_at = NOW() WHERE id = $2")
            .bind(&key)
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(|e| {
                warn!(storage.key = %key, "Photo stored but database update failed");
                AppError::from(e)
            })?;

        metrics::track_profile_image_uploaded();
        info!(storage.key = %key, png.size = png.len(), "Profile photo stored");
        Ok(true)
    }
}

impl UserService for PgUserService {
    fn create(&self, dto: CreateUserDto) -> ServiceFuture<'_, User> {
        Box::pin(self.create_user(dto))
    }

    fn find_all(&self, filters: UserFilterParams) -> ServiceFuture<'_, Vec<User>> {
        Box::pin(self.get_users(filters))
    }

    fn find_by_id(&self, id: UserId) -> ServiceFuture<'_, User> {
        Box::pin(self.get_user(id))
    }

    fn update(&self, id: UserId, dto: UpdateUserDto) -> ServiceFuture<'_, User> {
        Box::pin(self.update_user(id, dto))
    }

    fn delete(&self, id: UserId) -> ServiceFuture<'_, ()> {
        Box::pin(self.soft_delete_user(id))
    }

    fn delete_profile_photo(&self, id: UserId) -> ServiceFuture<'_, bool> {
        Box::pin(self.remove_profile_photo(id))
    }

    fn load_profile_image(&self, file: UploadedFile, id: UserId) -> ServiceFuture<'_, bool> {
        Box::pin(self.store_profile_image(file, id))
    }
}

fn user_not_found(id: UserId) -> AppError {
    AppError::not_found(anyhow!("User with id {} not found", id))
}

fn map_unique_violation(e: sqlx::Error, email: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        return AppError::conflict(anyhow!("User with email {} already exists", email));
    }
    error!(error = %e, "Database error writing user");
    AppError::from(e)
}

/// Decodes any supported image format and re-encodes it as PNG.
pub fn encode_as_png(bytes: &Bytes) -> Result<Vec<u8>, AppError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| AppError::bad_request(anyhow!("Invalid image file: {}", e)))?;

    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, image::ImageFormat::Png)
        .map_err(|e| AppError::internal_error(format!("Failed to encode image: {}", e)))?;

    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use image::{ImageBuffer, Rgb};

    fn jpeg_bytes() -> Bytes {
        let img = ImageBuffer::from_pixel(4, 3, Rgb([200u8, 10, 10]));
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, image::ImageFormat::Jpeg).unwrap();
        Bytes::from(buffer.into_inner())
    }

    #[test]
    fn test_profile_photo_key() {
        assert_eq!(profile_photo_key(UserId(9)), "profile_photos/9.png");
        assert_eq!(archived_photo_key(UserId(9)), "archived_photos/9.png");
    }

    #[test]
    fn test_encode_as_png_converts_jpeg() {
        let png = encode_as_png(&jpeg_bytes()).unwrap();
        assert_eq!(image::guess_format(&png).unwrap(), image::ImageFormat::Png);

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 3));
    }

    #[test]
    fn test_encode_as_png_rejects_garbage() {
        let err = encode_as_png(&Bytes::from_static(b"definitely not an image")).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
