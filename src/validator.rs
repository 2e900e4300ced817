//! Validating extractors for JSON bodies, query strings and path parameters.
//!
//! Each wraps the matching axum extractor, maps its rejection to a 400
//! [`AppError`] and then runs `validator::Validate` on the decoded value.
//! Field violations come back as `details`.

use anyhow::anyhow;
use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Path, Query, Request,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use userhub_core::AppError;
use validator::Validate;

/// Runs `Validate` on an already decoded value.
pub(crate) fn validate_value<T: Validate>(value: T) -> Result<T, AppError> {
    value
        .validate()
        .map_err(|errors| AppError::from_validation(&errors))?;
    Ok(value)
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    let error_msg = rejection.body_text();

    if error_msg.contains("missing field") {
        let field = error_msg
            .split("missing field `")
            .nth(1)
            .and_then(|s| s.split('`').next())
            .unwrap_or("unknown");
        return AppError::bad_request(anyhow!("{} is required", field));
    }

    if error_msg.contains("unknown field") {
        let field = error_msg
            .split("unknown field `")
            .nth(1)
            .and_then(|s| s.split('`').next())
            .unwrap_or("unknown");
        return AppError::bad_request(anyhow!("{} is not allowed", field));
    }

    if error_msg.contains("invalid type") || error_msg.contains("invalid digit") {
        return AppError::bad_request(anyhow!("Invalid field type in request"));
    }

    if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
        return AppError::bad_request(anyhow!(
            "Missing 'Content-Type: application/json' header"
        ));
    }

    AppError::bad_request(anyhow!("Invalid request body"))
}

/// JSON body, deserialized then validated.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;

        Ok(ValidatedJson(validate_value(value)?))
    }
}

/// Query string, deserialized then validated.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: QueryRejection| {
                AppError::bad_request(anyhow!("Invalid query parameters: {}", e.body_text()))
            })?;

        Ok(ValidatedQuery(validate_value(value)?))
    }
}

/// Path parameters, deserialized then validated.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedPath<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: PathRejection| {
                AppError::bad_request(anyhow!("Invalid path parameters: {}", e.body_text()))
            })?;

        Ok(ValidatedPath(validate_value(value)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Payload {
        #[validate(length(min = 3, message = "must be at least 3 characters"))]
        name: String,
        #[validate(range(min = 1, message = "must be positive"))]
        count: i32,
    }

    fn json_request(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_json_passes_through() {
        let ValidatedJson(payload) =
            ValidatedJson::<Payload>::from_request(json_request(r#"{"name":"abc","count":2}"#), &())
                .await
                .unwrap();
        assert_eq!(payload.name, "abc");
        assert_eq!(payload.count, 2);
    }

    #[tokio::test]
    async fn test_invalid_json_collects_field_details() {
        let err =
            ValidatedJson::<Payload>::from_request(json_request(r#"{"name":"a","count":0}"#), &())
                .await
                .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            err.details,
            vec![
                "count: must be positive".to_string(),
                "name: must be at least 3 characters".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_field_is_named() {
        let err = ValidatedJson::<Payload>::from_request(json_request(r#"{"name":"abc"}"#), &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error.to_string(), "count is required");
    }

    #[tokio::test]
    async fn test_missing_content_type_is_bad_request() {
        let req = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(r#"{"name":"abc","count":1}"#))
            .unwrap();
        let err = ValidatedJson::<Payload>::from_request(req, &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.error.to_string().contains("Content-Type"));
    }

    #[tokio::test]
    async fn test_query_is_validated() {
        #[derive(Debug, Deserialize, Validate)]
        struct Filter {
            #[validate(length(max = 3))]
            q: String,
        }

        let (mut parts, _) = Request::builder()
            .uri("/?q=toolong")
            .body(())
            .unwrap()
            .into_parts();
        let err = ValidatedQuery::<Filter>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.details.len(), 1);
        assert!(err.details[0].starts_with("q:"));
    }
}
