use axum::http::StatusCode;
use serde_json::json;

use crate::support::{Owner, TestApp};

#[tokio::test]
async fn agent_preview_matches_triggers() {
    let app = TestApp::new();
    let owner = Owner::new();

    let (status, agent) = app
        .post(
            "/api/v1/agents",
            &owner,
            json!({
                "name": "Support bot",
                "behavior": "Answer pricing questions",
                "goal": "Book demos",
                "tone": "friendly",
                "triggers": [
                    { "keyword": "price", "response": "Plans start at $19." },
                    { "keyword": "demo", "response": "Pick a slot here." }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{agent}");
    assert_eq!(agent["kind"], "agent");
    assert_eq!(agent["active"], true);

    let uri = format!("/api/v1/agents/{}/preview", agent["id"].as_str().unwrap());
    let (status, hit) = app
        .post(&uri, &owner, json!({ "message": "Can I see a DEMO?" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hit, json!({ "matched": true, "keyword": "demo", "reply": "Pick a slot here." }));

    let (_, miss) = app.post(&uri, &owner, json!({ "message": "hello" })).await;
    assert_eq!(miss["matched"], false);
}

#[tokio::test]
async fn inactive_persona_never_replies() {
    let app = TestApp::new();
    let owner = Owner::new();

    let (_, agent) = app
        .post(
            "/api/v1/agents",
            &owner,
            json!({
                "name": "Quiet",
                "tone": "casual",
                "active": false,
                "triggers": [{ "keyword": "hi", "response": "hello" }]
            }),
        )
        .await;
    let uri = format!("/api/v1/agents/{}/preview", agent["id"].as_str().unwrap());
    let (_, preview) = app.post(&uri, &owner, json!({ "message": "hi there" })).await;
    assert_eq!(preview["matched"], false);
}

#[tokio::test]
async fn creators_and_agents_are_separate() {
    let app = TestApp::new();
    let owner = Owner::new();

    let (status, body) = app
        .post("/api/v1/creators", &owner, json!({ "name": "No style", "niche": "fitness" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("style"));

    let (status, creator) = app
        .post(
            "/api/v1/creators",
            &owner,
            json!({ "name": "Coach", "niche": "fitness", "style": "inspirational", "tone": "casual" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(creator["kind"], "creator");
    assert!(creator.get("tone").is_none());

    let id = creator["id"].as_str().unwrap();
    let (status, _) = app.get(&format!("/api/v1/agents/{id}"), &owner).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, updated) = app
        .put(&format!("/api/v1/creators/{id}"), &owner, json!({ "style": "humorous" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["style"], "humorous");

    let (status, _) = app
        .put(&format!("/api/v1/creators/{id}"), &owner, json!({ "niche": "   " }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, fetched) = app.get(&format!("/api/v1/creators/{id}"), &owner).await;
    assert_eq!(fetched["niche"], "fitness");

    let (_, agents) = app.get("/api/v1/agents", &owner).await;
    assert_eq!(agents, json!([]));

    let (status, _) = app.delete(&format!("/api/v1/creators/{id}"), &owner).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn empty_trigger_keyword_is_rejected() {
    let app = TestApp::new();
    let owner = Owner::new();

    let (status, _) = app
        .post(
            "/api/v1/agents",
            &owner,
            json!({ "name": "Bad", "tone": "friendly", "triggers": [{ "keyword": "", "response": "x" }] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
