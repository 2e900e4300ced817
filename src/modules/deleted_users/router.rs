use crate::modules::deleted_users::controller::{get_deleted_users, purge_deleted_user};
use crate::state::AppState;
use axum::{Router, routing::get};

pub fn init_deleted_users_router() -> Router<AppState> {
    Router::new().route("/", get(get_deleted_users).delete(purge_deleted_user))
}
