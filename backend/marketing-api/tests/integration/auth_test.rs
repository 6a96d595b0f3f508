use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::support::{Owner, TestApp};

#[tokio::test]
async fn health_needs_no_token() {
    let app = TestApp::new();
    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("OK"));
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = TestApp::new();
    let (status, body) = app
        .request(Method::GET, "/api/v1/contacts", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn forged_token_is_unauthorized() {
    let app = TestApp::new();
    let forged = marketing_api::middleware::issue_token(
        "some-other-secret",
        uuid::Uuid::new_v4(),
        "mallory@example.com",
        1,
    )
    .unwrap();

    let (status, _) = app
        .request(Method::GET, "/api/v1/lists", Some(&forged), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request(Method::GET, "/api/v1/lists", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn other_owners_records_are_not_found() {
    let app = TestApp::new();
    let alice = Owner::new();
    let bob = Owner::new();

    let (status, list) = app
        .post("/api/v1/lists", &alice, json!({ "name": "Alice's leads" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let list_uri = format!("/api/v1/lists/{}", list["id"].as_str().unwrap());

    let (status, body) = app.get(&list_uri, &bob).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, _) = app.delete(&list_uri, &bob).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, lists) = app.get("/api/v1/lists", &bob).await;
    assert_eq!(lists, json!([]));

    let (status, _) = app.get(&list_uri, &alice).await;
    assert_eq!(status, StatusCode::OK);
}
