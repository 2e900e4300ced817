mod common;

use axum::http::StatusCode;
use common::{
    DeletedUserCall, FakeDeletedUserService, FakeUserService, TestApp, json_request,
};
use serde_json::json;
use userhub_models::{DeletedUserId, UserId};

// ============ GET /deleted-users ============

#[tokio::test]
async fn test_list_deleted_users_requires_token() {
    let app = TestApp::new();

    let (status, _) = app
        .send(json_request("GET", "/deleted-users", None, None))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(app.deleted_users.calls().is_empty());
}

#[tokio::test]
async fn test_list_deleted_users_forbidden_for_regular_user() {
    let app = TestApp::new();
    let token = app.token(42, "user");

    let (status, _) = app
        .send(json_request("GET", "/deleted-users", Some(&token), None))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(app.deleted_users.calls().is_empty());
}

#[tokio::test]
async fn test_list_deleted_users_as_admin() {
    let app = TestApp::new();
    let token = app.admin_token();

    let (status, body) = app
        .send(json_request(
            "GET",
            "/deleted-users?email=example&user_id=42&limit=500",
            Some(&token),
            None,
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["user_id"], 42);
    assert!(records[0]["deleted_at"].is_string());
    assert_eq!(
        app.deleted_users.calls(),
        vec![DeletedUserCall::FindAll {
            email: Some("example".to_string()),
            user_id: Some(UserId(42)),
            limit: 100,
        }]
    );
}

#[tokio::test]
async fn test_list_deleted_users_rejects_invalid_user_id() {
    let app = TestApp::new();
    let token = app.admin_token();

    let (status, _) = app
        .send(json_request(
            "GET",
            "/deleted-users?user_id=0",
            Some(&token),
            None,
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.deleted_users.calls().is_empty());
}

// ============ DELETE /deleted-users ============

#[tokio::test]
async fn test_purge_deleted_user_as_admin() {
    let app = TestApp::new();
    let token = app.admin_token();

    let (status, body) = app
        .send(json_request(
            "DELETE",
            "/deleted-users",
            Some(&token),
            Some(json!({ "id": 7 })),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "User deleted" }));
    assert_eq!(
        app.deleted_users.calls(),
        vec![DeletedUserCall::Delete(DeletedUserId(7))]
    );
}

#[tokio::test]
async fn test_purge_deleted_user_requires_token() {
    let app = TestApp::new();

    let (status, _) = app
        .send(json_request(
            "DELETE",
            "/deleted-users",
            None,
            Some(json!({ "id": 7 })),
        ))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(app.deleted_users.calls().is_empty());
}

#[tokio::test]
async fn test_purge_deleted_user_forbidden_for_regular_user() {
    let app = TestApp::new();
    let token = app.token(7, "user");

    let (status, _) = app
        .send(json_request(
            "DELETE",
            "/deleted-users",
            Some(&token),
            Some(json!({ "id": 7 })),
        ))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(app.deleted_users.calls().is_empty());
}

#[tokio::test]
async fn test_purge_deleted_user_validates_body() {
    let app = TestApp::new();
    let token = app.admin_token();

    for body in [json!({}), json!({ "id": 0 }), json!({ "id": "seven" })] {
        let (status, _) = app
            .send(json_request("DELETE", "/deleted-users", Some(&token), Some(body.clone())))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    }
    assert!(app.deleted_users.calls().is_empty());
}

#[tokio::test]
async fn test_purge_deleted_user_not_found() {
    let app = TestApp::with_services(
        FakeUserService::default(),
        FakeDeletedUserService {
            missing: vec![DeletedUserId(99)],
            ..Default::default()
        },
    );
    let token = app.admin_token();

    let (status, body) = app
        .send(json_request(
            "DELETE",
            "/deleted-users",
            Some(&token),
            Some(json!({ "id": 99 })),
        ))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Deleted user with id 99 not found");
}
