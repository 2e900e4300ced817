use serde::Serialize;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use userhub_core::pagination::PaginationParams;
use userhub_models::{
    CreateUserDto, DeletedUser, MessageResponse, ProfileImageResponse, PurgeDeletedUserDto,
    TargetUserBody, UpdateUserDto, User, UserRole,
};

/// Error body returned by every failing endpoint.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Per-field messages, present on validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

/// Multipart form accepted by the profile image upload.
#[derive(ToSchema)]
pub struct ProfileImageForm {
    /// PNG, JPEG or WebP file
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::delete_user,
        crate::modules::users::controller::delete_profile_image,
        crate::modules::users::controller::upload_profile_image,
        crate::modules::deleted_users::controller::get_deleted_users,
        crate::modules::deleted_users::controller::purge_deleted_user,
    ),
    components(
        schemas(
            User,
            UserRole,
            CreateUserDto,
            UpdateUserDto,
            TargetUserBody,
            DeletedUser,
            PurgeDeletedUserDto,
            MessageResponse,
            ProfileImageResponse,
            ProfileImageForm,
            PaginationParams,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Users", description = "User accounts and profile images"),
        (name = "Deleted Users", description = "Soft-deleted accounts, admin only")
    ),
    info(
        title = "Userhub API",
        version = "0.1.0",
        description = "User management REST API built with Rust, Axum, and PostgreSQL. Requests authenticate with a bearer JWT.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
