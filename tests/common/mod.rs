//! Shared harness for the router tests.
//!
//! The real router runs against in-memory services that record every call,
//! so the tests need no database.
#![allow(dead_code)]

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Utc;
use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use http_body_util::BodyExt;
use image::{DynamicImage, ImageFormat, RgbImage};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use userhub::middleware::upload::UploadedFile;
use userhub::modules::ServiceFuture;
use userhub::modules::deleted_users::service::DeletedUserService;
use userhub::modules::users::service::UserService;
use userhub::router::init_router;
use userhub::state::{AppState, init_file_storage};
use userhub_auth::create_access_token;
use userhub_config::{CorsConfig, JwtConfig, ServerConfig, UploadConfig};
use userhub_core::AppError;
use userhub_models::{
    CreateUserDto, DeletedUser, DeletedUserFilterParams, DeletedUserId, UpdateUserDto, User,
    UserFilterParams, UserId, UserRole,
};

pub const PUBLIC_BASE_URL: &str = "http://api.test";
pub const TEST_SECRET: &str = "integration-test-secret";
const BOUNDARY: &str = "userhub-test-boundary";

#[derive(Debug, Clone, PartialEq)]
pub enum UserCall {
    Create { email: String },
    FindAll {
        email: Option<String>,
        role: Option<UserRole>,
        limit: i64,
        offset: i64,
    },
    FindById(UserId),
    Update {
        id: UserId,
        first_name: Option<String>,
        role: Option<UserRole>,
    },
    Delete(UserId),
    DeleteProfilePhoto(UserId),
    LoadProfileImage {
        id: UserId,
        content_type: String,
        size: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeletedUserCall {
    FindAll {
        email: Option<String>,
        user_id: Option<UserId>,
        limit: i64,
    },
    Delete(DeletedUserId),
}

pub fn sample_user(id: UserId, role: UserRole) -> User {
    let now = Utc::now();
    User {
        id,
        first_name: FirstName().fake(),
        last_name: LastName().fake(),
        email: SafeEmail().fake(),
        role,
        profile_photo: None,
        created_at: now,
        updated_at: now,
    }
}

/// Records calls. Ids listed in `missing` answer with 404.
#[derive(Default)]
pub struct FakeUserService {
    pub calls: Mutex<Vec<UserCall>>,
    pub missing: Vec<UserId>,
}

impl FakeUserService {
    pub fn calls(&self) -> Vec<UserCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: UserCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_exists(&self, id: UserId) -> Result<(), AppError> {
        if self.missing.contains(&id) {
            return Err(AppError::not_found(anyhow!("User with id {} not found", id)));
        }
        Ok(())
    }
}

impl UserService for FakeUserService {
    fn create(&self, dto: CreateUserDto) -> ServiceFuture<'_, User> {
        Box::pin(async move {
            self.record(UserCall::Create {
                email: dto.email.clone(),
            });
            let mut user = sample_user(UserId(1), UserRole::User);
            user.first_name = dto.first_name;
            user.last_name = dto.last_name;
            user.email = dto.email;
            Ok(user)
        })
    }

    fn find_all(&self, filters: UserFilterParams) -> ServiceFuture<'_, Vec<User>> {
        Box::pin(async move {
            self.record(UserCall::FindAll {
                email: filters.email.clone(),
                role: filters.role,
                limit: filters.pagination.limit(),
                offset: filters.pagination.offset(),
            });
            Ok(vec![
                sample_user(UserId(1), UserRole::Admin),
                sample_user(UserId(2), UserRole::User),
            ])
        })
    }

    fn find_by_id(&self, id: UserId) -> ServiceFuture<'_, User> {
        Box::pin(async move {
            self.record(UserCall::FindById(id));
            self.check_exists(id)?;
            Ok(sample_user(id, UserRole::User))
        })
    }

    fn update(&self, id: UserId, dto: UpdateUserDto) -> ServiceFuture<'_, User> {
        Box::pin(async move {
            self.record(UserCall::Update {
                id,
                first_name: dto.first_name.clone(),
                role: dto.role,
            });
            self.check_exists(id)?;
            let mut user = sample_user(id, dto.role.unwrap_or_default());
            if let Some(first_name) = dto.first_name {
                user.first_name = first_name;
            }
            Ok(user)
        })
    }

    fn delete(&self, id: UserId) -> ServiceFuture<'_, ()> {
        Box::pin(async move {
            self.record(UserCall::Delete(id));
            self.check_exists(id)
        })
    }

    fn delete_profile_photo(&self, id: UserId) -> ServiceFuture<'_, bool> {
        Box::pin(async move {
            self.record(UserCall::DeleteProfilePhoto(id));
            self.check_exists(id)?;
            Ok(true)
        })
    }

    fn load_profile_image(&self, file: UploadedFile, id: UserId) -> ServiceFuture<'_, bool> {
        Box::pin(async move {
            self.record(UserCall::LoadProfileImage {
                id,
                content_type: file.content_type.clone(),
                size: file.size(),
            });
            self.check_exists(id)?;
            Ok(true)
        })
    }
}

#[derive(Default)]
pub struct FakeDeletedUserService {
    pub calls: Mutex<Vec<DeletedUserCall>>,
    pub missing: Vec<DeletedUserId>,
}

impl FakeDeletedUserService {
    pub fn calls(&self) -> Vec<DeletedUserCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl DeletedUserService for FakeDeletedUserService {
    fn find_all(&self, filters: DeletedUserFilterParams) -> ServiceFuture<'_, Vec<DeletedUser>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(DeletedUserCall::FindAll {
                email: filters.email.clone(),
                user_id: filters.user_id,
                limit: filters.pagination.limit(),
            });
            let now = Utc::now();
            Ok(vec![DeletedUser {
                id: DeletedUserId(3),
                user_id: UserId(42),
                first_name: FirstName().fake(),
                last_name: LastName().fake(),
                email: SafeEmail().fake(),
                role: UserRole::User,
                profile_photo: None,
                created_at: now,
                deleted_at: now,
            }])
        })
    }

    fn delete(&self, id: DeletedUserId) -> ServiceFuture<'_, ()> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(DeletedUserCall::Delete(id));
            if self.missing.contains(&id) {
                return Err(AppError::not_found(anyhow!(
                    "Deleted user with id {} not found",
                    id
                )));
            }
            Ok(())
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub users: Arc<FakeUserService>,
    pub deleted_users: Arc<FakeDeletedUserService>,
    pub jwt_config: JwtConfig,
    pub upload_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_services(FakeUserService::default(), FakeDeletedUserService::default())
    }

    pub fn with_services(users: FakeUserService, deleted_users: FakeDeletedUserService) -> Self {
        Self::build(users, deleted_users, None)
    }

    /// Same as [`TestApp::new`] with `UPLOAD_MAX_BYTES` set.
    pub fn with_upload_limit(max_bytes: usize) -> Self {
        Self::build(
            FakeUserService::default(),
            FakeDeletedUserService::default(),
            Some(max_bytes),
        )
    }

    fn build(
        users: FakeUserService,
        deleted_users: FakeDeletedUserService,
        max_upload_bytes: Option<usize>,
    ) -> Self {
        let upload_dir = TempDir::new().unwrap();
        let upload_path = upload_dir.path().to_string_lossy().into_owned();

        let jwt_config = JwtConfig::from_lookup(|key| {
            (key == "JWT_SECRET").then(|| TEST_SECRET.to_string())
        });
        let server_config = ServerConfig::from_lookup(|key| {
            (key == "PUBLIC_BASE_URL").then(|| PUBLIC_BASE_URL.to_string())
        });
        let upload_config = UploadConfig::from_lookup(|key| match key {
            "UPLOAD_DIR" => Some(upload_path.clone()),
            "UPLOAD_MAX_BYTES" => max_upload_bytes.map(|max| max.to_string()),
            _ => None,
        });

        let users = Arc::new(users);
        let deleted_users = Arc::new(deleted_users);
        let state = AppState {
            users: users.clone(),
            deleted_users: deleted_users.clone(),
            file_storage: Arc::new(init_file_storage(&server_config, &upload_config)),
            jwt_config: jwt_config.clone(),
            server_config,
            upload_config,
            cors_config: CorsConfig::default(),
        };

        Self {
            router: init_router(state),
            users,
            deleted_users,
            jwt_config,
            upload_dir,
        }
    }

    pub fn token(&self, user_id: i32, role: &str) -> String {
        create_access_token(user_id, role, &self.jwt_config).unwrap()
    }

    pub fn admin_token(&self) -> String {
        self.token(1, "admin")
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or(Value::Null)
        };
        (status, body)
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// A `multipart/form-data` request with a single file part.
pub fn multipart_request(
    uri: &str,
    token: Option<&str>,
    field: &str,
    content_type: &str,
    bytes: &[u8],
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"avatar\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}

/// A multipart request whose only part is a plain text field.
pub fn multipart_text_only(uri: &str, token: &str) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"caption\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
    );
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(body))
        .unwrap()
}

pub fn png_bytes() -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, image::Rgb([200, 40, 40])));
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

pub fn generate_unique_email() -> String {
    format!("{}@example.com", uuid::Uuid::new_v4().simple())
}
