//! Upload directory and profile image constraints.

use std::env;
use std::path::PathBuf;

use crate::parse_or;

pub const DEFAULT_MAX_BYTES: usize = 5 * 1024 * 1024;
const DEFAULT_ALLOWED_TYPES: &str = "image/png,image/jpeg,image/webp";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadConfig {
    /// Directory served under `/public`.
    pub dir: PathBuf,
    pub max_bytes: usize,
    pub allowed_mime_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl UploadConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let allowed_mime_types = lookup("UPLOAD_ALLOWED_TYPES")
            .unwrap_or_else(|| DEFAULT_ALLOWED_TYPES.to_string())
            .split(',')
            .map(|s| s.trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            dir: PathBuf::from(lookup("UPLOAD_DIR").unwrap_or_else(|| "public".to_string())),
            max_bytes: parse_or(lookup("UPLOAD_MAX_BYTES"), DEFAULT_MAX_BYTES),
            allowed_mime_types,
        }
    }

    pub fn is_allowed(&self, mime_type: &str) -> bool {
        let mime_type = mime_type.to_ascii_lowercase();
        self.allowed_mime_types.iter().any(|allowed| *allowed == mime_type)
    }
}
