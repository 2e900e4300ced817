//! Extractors and layers that run before the handlers.
//!
//! - [`auth`]: Bearer JWT authentication ([`auth::AuthUser`])
//! - [`role`]: Admin-only and self-or-admin authorization
//! - [`upload`]: Multipart profile image extraction and checks
//!
//! A protected route resolves, in order: the token, the caller's role, the
//! target user, and finally the validated payload. Each step rejects with an
//! [`userhub_core::AppError`] so failures share one JSON shape.

pub mod auth;
pub mod role;
pub mod upload;
