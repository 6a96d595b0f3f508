use axum::http::StatusCode;
use serde_json::json;

use crate::support::{Owner, TestApp};

#[tokio::test]
async fn connection_outcome_follows_email() {
    let app = TestApp::new();
    let owner = Owner::new();

    let (status, ok) = app
        .post(
            "/api/v1/accounts",
            &owner,
            json!({ "platform": "instagram", "email": "brand@example.com", "password": "secret" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(ok["status"], "connected");
    assert!(ok["connected_at"].is_string());
    assert!(ok.get("password").is_none());

    let (status, failed) = app
        .post(
            "/api/v1/accounts",
            &owner,
            json!({ "platform": "linkedin", "email": "blocked.user@example.com", "password": "secret" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(failed["status"], "failed");
    assert!(failed["failure_reason"].as_str().unwrap().contains("LinkedIn"));

    let (_, linkedin) = app.get("/api/v1/accounts?platform=linkedin", &owner).await;
    assert_eq!(linkedin.as_array().unwrap().len(), 1);

    let (_, stats) = app.get("/api/v1/dashboard/stats", &owner).await;
    assert_eq!(stats["accounts"], json!({ "total": 2, "connected": 1, "failed": 1 }));
}

#[tokio::test]
async fn reconnect_reruns_the_login() {
    let app = TestApp::new();
    let owner = Owner::new();

    let (_, account) = app
        .post(
            "/api/v1/accounts",
            &owner,
            json!({ "platform": "email", "email": "news@example.com", "password": "" }),
        )
        .await;
    assert_eq!(account["status"], "failed");

    let uri = format!("/api/v1/accounts/{}/reconnect", account["id"].as_str().unwrap());
    let (status, reconnected) = app.post(&uri, &owner, json!({ "password": "hunter2" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reconnected["status"], "connected");
    assert_eq!(reconnected["failure_reason"], json!(null));
    assert_eq!(reconnected["id"], account["id"]);
}

#[tokio::test]
async fn deleted_account_is_gone() {
    let app = TestApp::new();
    let owner = Owner::new();

    let (_, account) = app
        .post(
            "/api/v1/accounts",
            &owner,
            json!({ "platform": "facebook", "email": "page@example.com", "password": "pw" }),
        )
        .await;
    let uri = format!("/api/v1/accounts/{}", account["id"].as_str().unwrap());

    let (status, _) = app.delete(&uri, &owner).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get(&uri, &owner).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn templates_filter_by_platform() {
    let app = TestApp::new();
    let owner = Owner::new();

    let (status, email) = app
        .post(
            "/api/v1/templates",
            &owner,
            json!({ "platform": "email", "name": "Welcome", "subject": "Hello!", "body": "Hi {{name}}" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    app.post(
        "/api/v1/templates",
        &owner,
        json!({ "platform": "linkedin", "name": "Intro", "body": "Nice to meet you" }),
    )
    .await;

    let (_, only_email) = app.get("/api/v1/templates?platform=email", &owner).await;
    assert_eq!(only_email, json!([email.clone()]));

    let uri = format!("/api/v1/templates/{}", email["id"].as_str().unwrap());
    let (status, updated) = app.put(&uri, &owner, json!({ "subject": null })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["subject"], json!(null));
    assert_eq!(updated["body"], "Hi {{name}}");
}
