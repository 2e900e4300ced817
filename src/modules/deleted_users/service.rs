use std::sync::Arc;

use anyhow::anyhow;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, error, info, instrument, warn};
use userhub_core::{AppError, FileStorage};
use userhub_models::{DeletedUser, DeletedUserFilterParams, DeletedUserId};

use crate::metrics;
use crate::modules::{ServiceFuture, contains_pattern};

const DELETED_USER_COLUMNS: &str =
    "id, user_id, first_name, last_name, email, role, profile_photo, created_at, deleted_at";

/// Read and purge access to soft-deleted users.
pub trait DeletedUserService: Send + Sync {
    /// Newest deletions first.
    fn find_all(&self, filters: DeletedUserFilterParams) -> ServiceFuture<'_, Vec<DeletedUser>>;

    /// Permanently removes the record. 404 if it does not exist.
    fn delete(&self, id: DeletedUserId) -> ServiceFuture<'_, ()>;
}

pub struct PgDeletedUserService {
    db: PgPool,
    file_storage: Arc<dyn FileStorage>,
}

impl PgDeletedUserService {
    pub fn new(db: PgPool, file_storage: Arc<dyn FileStorage>) -> Self {
        Self { db, file_storage }
    }

    #[instrument(skip(self), fields(db.operation = "SELECT", db.table = "deleted_users"))]
    async fn get_deleted_users(
        &self,
        filters: DeletedUserFilterParams,
    ) -> Result<Vec<DeletedUser>, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM deleted_users WHERE 1=1",
            DELETED_USER_COLUMNS
        ));

        if let Some(email) = &filters.email {
            query.push(" AND email ILIKE ").push_bind(contains_pattern(email));
        }
        if let Some(user_id) = filters.user_id {
            query.push(" AND user_id = ").push_bind(user_id);
        }

        query
            .push(" ORDER BY deleted_at DESC, id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let records = query
            .build_query_as::<DeletedUser>()
            .fetch_all(&self.db)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error fetching deleted users");
                AppError::from(e)
            })?;

        debug!(returned = records.len(), limit, offset, "Deleted users fetched");
        Ok(records)
    }

    #[instrument(skip(self), fields(deleted_user.id = %id, db.operation = "DELETE", db.table = "deleted_users"))]
    async fn purge_deleted_user(&self, id: DeletedUserId) -> Result<(), AppError> {
        let photo = sqlx::query_scalar::<_, Option<String>>(
            "DELETE FROM deleted_users WHERE id = $1 RETURNING profile_photo",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Deleted user with id {} not found", id)))?;

        // The record is gone either way; a leftover file is only logged.
        if let Some(key) = photo
            && let Err(e) = self.file_storage.delete(&key).await
        {
            warn!(storage.key = %key, error = %e, "Failed to remove purged user's photo");
        }

        metrics::track_deleted_user_purged();
        info!("Deleted user purged");
        Ok(())
    }
}

impl DeletedUserService for PgDeletedUserService {
    fn find_all(&self, filters: DeletedUserFilterParams) -> ServiceFuture<'_, Vec<DeletedUser>> {
        Box::pin(self.get_deleted_users(filters))
    }

    fn delete(&self, id: DeletedUserId) -> ServiceFuture<'_, ()> {
        Box::pin(self.purge_deleted_user(id))
    }
}
