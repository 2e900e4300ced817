//! Feature modules. Each has a `router`, a `controller` with the HTTP
//! handlers, and a `service` with the business logic behind a trait.

use std::future::Future;
use std::pin::Pin;

use userhub_core::AppError;

pub mod deleted_users;
pub mod users;

/// Boxed future returned by service trait methods, keeping the traits object safe.
pub type ServiceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, AppError>> + Send + 'a>>;

/// `ILIKE` pattern matching `value` anywhere, with wildcards in `value` escaped.
pub(crate) fn contains_pattern(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
