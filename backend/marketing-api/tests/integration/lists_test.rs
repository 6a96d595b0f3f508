use axum::http::StatusCode;
use serde_json::json;

use crate::support::{csv_rows, Owner, TestApp};

#[tokio::test]
async fn deleting_a_list_deletes_its_contacts() {
    let app = TestApp::new();
    let owner = Owner::new();

    let (_, list) = app
        .post("/api/v1/lists", &owner, json!({ "name": "Webinar", "segment": "events" }))
        .await;
    let list_id = list["id"].as_str().unwrap().to_string();

    for i in 0..3 {
        let (status, _) = app
            .post(
                "/api/v1/contacts",
                &owner,
                json!({ "name": format!("Guest {i}"), "email": format!("guest{i}@example.com"), "list_id": list_id }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (_, loose) = app
        .post(
            "/api/v1/contacts",
            &owner,
            json!({ "name": "Unlisted", "email": "unlisted@example.com" }),
        )
        .await;

    let (_, fetched) = app.get(&format!("/api/v1/lists/{list_id}"), &owner).await;
    assert_eq!(fetched["contact_count"], 3);

    let (status, body) = app.delete(&format!("/api/v1/lists/{list_id}"), &owner).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted_contacts"], 3);

    let (_, remaining) = app.get("/api/v1/contacts", &owner).await;
    let remaining = remaining.as_array().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["id"], loose["id"]);

    let (status, _) = app
        .get(&format!("/api/v1/lists/{list_id}/contacts"), &owner)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn import_creates_list_with_contacts() {
    let app = TestApp::new();
    let owner = Owner::new();

    let (status, body) = app
        .upload(
            "/api/v1/lists/import",
            &owner,
            &[("list_name", "Trade show"), ("segment", "expo")],
            "leads.csv",
            &csv_rows(100),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["imported"], 100);
    assert_eq!(body["list"]["name"], "Trade show");
    assert_eq!(body["list"]["contact_count"], 100);

    let list_id = body["list"]["id"].as_str().unwrap();
    let (_, members) = app
        .get(&format!("/api/v1/lists/{list_id}/contacts"), &owner)
        .await;
    let members = members.as_array().unwrap();
    assert_eq!(members.len(), 100);
    assert_eq!(members[0]["segments"], json!(["prospect", "expo"]));
}

#[tokio::test]
async fn oversized_import_is_rejected_and_nothing_is_saved() {
    let app = TestApp::new();
    let owner = Owner::new();

    let (status, body) = app
        .upload(
            "/api/v1/lists/import",
            &owner,
            &[("list_name", "Too big")],
            "leads.csv",
            &csv_rows(101),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "IMPORT_LIMIT_EXCEEDED");

    let (_, lists) = app.get("/api/v1/lists", &owner).await;
    assert_eq!(lists, json!([]));
    let (_, contacts) = app.get("/api/v1/contacts", &owner).await;
    assert_eq!(contacts, json!([]));
}

#[tokio::test]
async fn import_appends_to_existing_list() {
    let app = TestApp::new();
    let owner = Owner::new();

    let (_, list) = app
        .post("/api/v1/lists", &owner, json!({ "name": "Newsletter" }))
        .await;
    let uri = format!("/api/v1/lists/{}/import", list["id"].as_str().unwrap());

    let json_file = r#"[{"name": "Ada", "email": "ada@example.com"}, {"email": "grace@example.com"}]"#;
    let (status, body) = app.upload(&uri, &owner, &[], "people.json", json_file).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["imported"], 2);

    let (status, body) = app.upload(&uri, &owner, &[], "more.csv", &csv_rows(3)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["list"]["contact_count"], 5);
}

#[tokio::test]
async fn import_into_foreign_list_is_not_found() {
    let app = TestApp::new();
    let alice = Owner::new();
    let bob = Owner::new();

    let (_, list) = app
        .post("/api/v1/lists", &alice, json!({ "name": "Private" }))
        .await;
    let uri = format!("/api/v1/lists/{}/import", list["id"].as_str().unwrap());

    let (status, _) = app.upload(&uri, &bob, &[], "leads.csv", &csv_rows(2)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, contacts) = app.get("/api/v1/contacts", &bob).await;
    assert_eq!(contacts, json!([]));
}

#[tokio::test]
async fn import_without_list_name_is_rejected() {
    let app = TestApp::new();
    let owner = Owner::new();

    let (status, body) = app
        .upload("/api/v1/lists/import", &owner, &[], "leads.csv", &csv_rows(1))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn blank_names_are_rejected() {
    let app = TestApp::new();
    let owner = Owner::new();

    let (status, body) = app.post("/api/v1/lists", &owner, json!({ "name": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, _) = app
        .post(
            "/api/v1/contacts",
            &owner,
            json!({ "name": " ", "email": "ada@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/api/v1/campaigns", &owner, json!({ "name": "\t", "platform": "email" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, list) = app
        .post("/api/v1/lists", &owner, json!({ "name": "  Webinar  " }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(list["name"], "Webinar");

    let uri = format!("/api/v1/lists/{}", list["id"].as_str().unwrap());
    let (status, _) = app.put(&uri, &owner, json!({ "name": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, lists) = app.get("/api/v1/lists", &owner).await;
    assert_eq!(lists.as_array().unwrap().len(), 1);
    assert_eq!(lists[0]["name"], "Webinar");
}

#[tokio::test]
async fn unreadable_workbook_is_rejected_with_its_cause() {
    let app = TestApp::new();
    let owner = Owner::new();

    let (status, body) = app
        .upload(
            "/api/v1/lists/import",
            &owner,
            &[("list_name", "Expo leads")],
            "leads.xlsx",
            "PK\u{3}\u{4} truncated workbook",
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.starts_with("Unreadable spreadsheet"), "{message}");

    let (_, lists) = app.get("/api/v1/lists", &owner).await;
    assert_eq!(lists, json!([]));
}
