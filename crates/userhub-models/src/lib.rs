//! # Userhub Models
//!
//! Domain models and DTOs for the Userhub API: database entities, request
//! payloads with their validation rules, and response bodies.
//!
//! - [`ids`]: Strongly-typed integer IDs
//! - [`users`]: Users, roles, and user request/response DTOs
//! - [`deleted_users`]: Soft-deleted user records and their DTOs

pub mod deleted_users;
pub mod ids;
pub mod users;

pub use deleted_users::{DeletedUser, DeletedUserFilterParams, PurgeDeletedUserDto};
pub use ids::{DeletedUserId, UserId};
pub use users::{
    CreateUserDto, GetUserParams, MessageResponse, ProfileImageResponse, TargetUserBody,
    TargetUserQuery, UpdateUserDto, User, UserFilterParams, UserRole,
};
