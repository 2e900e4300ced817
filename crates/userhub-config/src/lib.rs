//! # Userhub Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`jwt`]: JWT verification and issuance settings
//! - [`server`]: Bind address and the public base URL used in responses
//! - [`upload`]: Upload directory and profile image constraints
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//!
//! Every struct exposes `from_env()`, which delegates to `from_lookup()` so
//! tests can feed values without touching the process environment.
//!
//! ```ignore
//! use userhub_config::{CorsConfig, JwtConfig, ServerConfig, UploadConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let server_config = ServerConfig::from_env();
//! ```

pub mod cors;
pub mod jwt;
pub mod server;
pub mod upload;

// Re-export commonly used types at crate root
pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use server::ServerConfig;
pub use upload::UploadConfig;

pub(crate) fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|s| s.trim().parse().ok()).unwrap_or(default)
}

#[cfg(test)]
pub(crate) fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: std::collections::HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}
