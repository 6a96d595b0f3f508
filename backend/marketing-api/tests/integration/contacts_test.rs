use axum::http::StatusCode;
use serde_json::json;

use crate::support::{Owner, TestApp};

#[tokio::test]
async fn created_contact_round_trips() {
    let app = TestApp::new();
    let owner = Owner::new();

    let (status, created) = app
        .post(
            "/api/v1/contacts",
            &owner,
            json!({
                "name": "Ada Lovelace",
                "email": " Ada@Example.com ",
                "phone": "555-0100",
                "social": { "linkedin": "in/ada", "twitter": "@ada" },
                "segments": ["VIP", "beta", "vip"]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["email"], "Ada@Example.com");
    assert_eq!(created["owner_id"], owner.id.to_string());
    assert_eq!(created["segments"], json!(["VIP", "beta"]));

    let uri = format!("/api/v1/contacts/{}", created["id"].as_str().unwrap());
    let (status, fetched) = app.get(&uri, &owner).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn update_clears_phone_with_null() {
    let app = TestApp::new();
    let owner = Owner::new();

    let (_, created) = app
        .post(
            "/api/v1/contacts",
            &owner,
            json!({ "name": "Grace", "email": "grace@example.com", "phone": "555-0101" }),
        )
        .await;
    let uri = format!("/api/v1/contacts/{}", created["id"].as_str().unwrap());

    let (status, updated) = app
        .put(&uri, &owner, json!({ "phone": null, "name": "Grace Hopper" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Grace Hopper");
    assert_eq!(updated["phone"], json!(null));
    assert_eq!(updated["email"], "grace@example.com");
}

#[tokio::test]
async fn invalid_email_is_bad_request() {
    let app = TestApp::new();
    let owner = Owner::new();

    let (status, body) = app
        .post(
            "/api/v1/contacts",
            &owner,
            json!({ "name": "Broken", "email": "not-an-email" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn filters_by_segment_and_search() {
    let app = TestApp::new();
    let owner = Owner::new();

    for (name, email, segments) in [
        ("Ada", "ada@example.com", json!(["vip"])),
        ("Grace", "grace@navy.mil", json!(["navy"])),
        ("Linus", "linus@example.com", json!(["VIP"])),
    ] {
        let (status, _) = app
            .post(
                "/api/v1/contacts",
                &owner,
                json!({ "name": name, "email": email, "segments": segments }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, vip) = app.get("/api/v1/contacts?segment=vip", &owner).await;
    assert_eq!(vip.as_array().unwrap().len(), 2);

    let (_, navy) = app.get("/api/v1/contacts?search=NAVY", &owner).await;
    assert_eq!(navy.as_array().unwrap().len(), 1);
    assert_eq!(navy[0]["name"], "Grace");

    let (_, segments) = app.get("/api/v1/segments", &owner).await;
    let segments = segments.as_array().unwrap();
    assert_eq!(segments.len(), 2);
    assert!(segments[0]["name"].as_str().unwrap().eq_ignore_ascii_case("vip"));
    assert_eq!(segments[0]["contact_count"], 2);
    assert_eq!(segments[1], json!({ "name": "navy", "contact_count": 1 }));
}

#[tokio::test]
async fn malformed_id_is_bad_request() {
    let app = TestApp::new();
    let owner = Owner::new();
    let (status, _) = app.get("/api/v1/contacts/not-a-uuid", &owner).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
