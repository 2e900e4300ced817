//! Pagination query parameters.
//!
//! Supports offset-based (`limit` + `offset`) and page-based (`limit` +
//! `page`) pagination. When `page` is provided it takes precedence over
//! `offset`.
//!
//! ```ignore
//! // GET /users?limit=20&page=3
//! let limit = params.limit();   // 20
//! let offset = params.offset(); // 40
//! ```

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::serde::optional_from_str;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Query parameters for pagination.
///
/// - `limit` is clamped to `[1, 100]`, default 10
/// - `offset` is clamped to a minimum of 0
/// - `page` is 1-indexed and clamped to a minimum of 1
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Maximum number of items to return (1-100, default: 10)
    #[serde(default, deserialize_with = "optional_from_str")]
    pub limit: Option<i64>,
    /// Number of items to skip (default: 0, ignored if `page` is set)
    #[serde(default, deserialize_with = "optional_from_str")]
    pub offset: Option<i64>,
    /// Page number (1-indexed)
    #[serde(default, deserialize_with = "optional_from_str")]
    pub page: Option<i64>,
}

impl PaginationParams {
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        match self.page {
            Some(page) => (page.max(1) - 1).saturating_mul(self.limit()),
            None => self.offset.unwrap_or(0).max(0),
        }
    }
}
