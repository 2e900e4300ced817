mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{TestApp, json_request, png_bytes};
use http_body_util::BodyExt;
use tower::ServiceExt;
use userhub::logging::REQUEST_ID_HEADER;

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();

    let (status, body) = app.send(json_request("GET", "/health", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = TestApp::new();

    let (status, body) = app
        .send(json_request("GET", "/api-docs/openapi.json", None, None))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/users"].is_object());
    assert!(body["paths"]["/deleted-users"].is_object());
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = TestApp::new();

    let response = app
        .router
        .clone()
        .oneshot(json_request("GET", "/users", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
}

#[tokio::test]
async fn test_uploaded_files_are_served_under_public() {
    let app = TestApp::new();
    let png = png_bytes();
    let dir = app.upload_dir.path().join("profile_photos");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("9.png"), &png).unwrap();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/public/profile_photos/9.png")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(body.as_ref(), png.as_slice());
}

#[tokio::test]
async fn test_archived_photos_are_not_served() {
    let app = TestApp::new();
    let dir = app.upload_dir.path().join("archived_photos");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("9.png"), png_bytes()).unwrap();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/public/archived_photos/9.png")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::new();

    let (status, _) = app
        .send(json_request("GET", "/api/users", None, None))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
