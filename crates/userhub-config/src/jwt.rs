use std::env;

use crate::parse_or;

const DEV_SECRET: &str = "your-secret-key-change-in-production";

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    /// Access token lifetime in seconds.
    pub access_token_expiry: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            secret: lookup("JWT_SECRET").unwrap_or_else(|| DEV_SECRET.to_string()),
            access_token_expiry: parse_or(lookup("JWT_ACCESS_EXPIRY"), 3600), // 1 hour
        }
    }
}
