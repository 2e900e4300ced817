//! # Userhub Core
//!
//! Core types, errors, and utilities for the Userhub API.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`file_storage`]: Storage abstraction for uploaded files
//! - [`pagination`]: Limit/offset/page query parameters
//! - [`password`]: Password hashing
//! - [`serde`]: Custom deserializers for query strings and request bodies
//!
//! # Example
//!
//! ```ignore
//! use userhub_core::errors::AppError;
//! use userhub_core::pagination::PaginationParams;
//!
//! let error = AppError::not_found(anyhow::anyhow!("User not found"));
//!
//! let params = PaginationParams::default();
//! let limit = params.limit();
//! ```

pub mod errors;
pub mod file_storage;
pub mod pagination;
pub mod password;
pub mod serde;

// Re-export commonly used types at crate root
pub use errors::AppError;
pub use file_storage::{FileStorage, LocalFileStorage, StorageError};
pub use pagination::PaginationParams;
pub use password::{hash_password, hash_password_async};
