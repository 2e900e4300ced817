use crate::modules::users::controller::{
    create_user, delete_profile_image, delete_user, get_user, get_users, update_user,
    upload_profile_image,
};
use crate::state::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};

/// Multipart framing on top of the raw file size.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn init_users_router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(get_users)
                .post(create_user)
                .patch(update_user)
                .delete(delete_user),
        )
        .route("/{id}", get(get_user))
        .route("/delete_profile_image", delete(delete_profile_image))
        .route(
            "/upload_profile_image",
            post(upload_profile_image).layer(DefaultBodyLimit::max(
                max_upload_bytes.saturating_add(MULTIPART_OVERHEAD),
            )),
        )
}
