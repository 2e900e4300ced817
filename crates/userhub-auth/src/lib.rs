//! # Userhub Auth
//!
//! Authentication types and JWT utilities for the Userhub API.
//!
//! - [`claims`]: Access token claim structure
//! - [`jwt`]: Token creation and verification
//!
//! Tokens are HS256-signed with the secret from [`userhub_config::JwtConfig`].
//! The subject claim is the numeric user id rendered as a string; the role
//! claim is the user's role name (`admin` or `user`).
//!
//! ```ignore
//! use userhub_auth::{create_access_token, verify_token};
//! use userhub_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(42, "user", &config)?;
//! let claims = verify_token(&token, &config)?;
//! assert_eq!(claims.sub, "42");
//! ```

pub mod claims;
pub mod jwt;

// Re-export commonly used types at crate root
pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
