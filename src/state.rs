use std::sync::Arc;

use userhub_config::{CorsConfig, JwtConfig, ServerConfig, UploadConfig};
use userhub_core::{FileStorage, LocalFileStorage};
use userhub_db::PgPool;

use crate::modules::deleted_users::service::{DeletedUserService, PgDeletedUserService};
use crate::modules::users::service::{PgUserService, UserService};

/// Shared application state handed to every handler and extractor.
///
/// Services sit behind trait objects so tests can swap in in-memory fakes.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserService>,
    pub deleted_users: Arc<dyn DeletedUserService>,
    pub file_storage: Arc<dyn FileStorage>,
    pub jwt_config: JwtConfig,
    pub server_config: ServerConfig,
    pub upload_config: UploadConfig,
    pub cors_config: CorsConfig,
}

impl AppState {
    /// Public URL for a stored file, e.g. a profile photo key.
    pub fn public_url(&self, key: &str) -> Result<String, userhub_core::AppError> {
        self.file_storage
            .get_url(key)
            .map_err(userhub_core::AppError::internal)
    }
}

/// Storage rooted at the upload directory and served under `/public`.
pub fn init_file_storage(server: &ServerConfig, upload: &UploadConfig) -> LocalFileStorage {
    LocalFileStorage::new(
        upload.dir.clone(),
        format!("{}/public", server.public_base_url),
    )
}

pub fn init_app_state(db: PgPool) -> AppState {
    let server_config = ServerConfig::from_env();
    let upload_config = UploadConfig::from_env();
    let file_storage: Arc<dyn FileStorage> =
        Arc::new(init_file_storage(&server_config, &upload_config));

    AppState {
        users: Arc::new(PgUserService::new(db.clone(), file_storage.clone())),
        deleted_users: Arc::new(PgDeletedUserService::new(db, file_storage.clone())),
        file_storage,
        jwt_config: JwtConfig::from_env(),
        server_config,
        upload_config,
        cors_config: CorsConfig::from_env(),
    }
}
