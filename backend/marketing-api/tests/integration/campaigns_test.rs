use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::support::{Owner, TestApp};

async fn create_campaign(app: &TestApp, owner: &Owner, blocks: Value) -> Value {
    let (status, campaign) = app
        .post(
            "/api/v1/campaigns",
            owner,
            json!({ "name": "Spring outreach", "platform": "linkedin", "blocks": blocks }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{campaign}");
    campaign
}

fn block_ids(campaign: &Value) -> Vec<String> {
    campaign["blocks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn new_campaign_is_a_draft_with_zero_stats() {
    let app = TestApp::new();
    let owner = Owner::new();

    let campaign = create_campaign(
        &app,
        &owner,
        json!([{ "action": "view_profile" }, { "action": "connection_request", "label": "Say hi" }]),
    )
    .await;

    assert_eq!(campaign["status"], "draft");
    assert_eq!(campaign["blocks"][0]["label"], "View profile");
    assert_eq!(campaign["blocks"][1]["label"], "Say hi");

    let id = campaign["id"].as_str().unwrap();
    let (status, stats) = app
        .get(&format!("/api/v1/campaigns/{id}/stats"), &owner)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        stats,
        json!({ "sent": 0, "delivered": 0, "opened": 0, "clicked": 0, "replied": 0 })
    );

    let (_, fetched) = app.get(&format!("/api/v1/campaigns/{id}"), &owner).await;
    assert_eq!(fetched, campaign);
}

#[tokio::test]
async fn block_edits_persist() {
    let app = TestApp::new();
    let owner = Owner::new();
    let campaign = create_campaign(&app, &owner, json!([{ "action": "view_profile" }])).await;
    let base = format!("/api/v1/campaigns/{}/blocks", campaign["id"].as_str().unwrap());

    let (status, _) = app
        .post(&base, &owner, json!({ "action": "wait", "delay_hours": 24 }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, campaign) = app
        .post(&base, &owner, json!({ "action": "send_message" }))
        .await;
    let ids = block_ids(&campaign);
    assert_eq!(ids.len(), 3);
    assert_eq!(campaign["blocks"][1]["delay_hours"], 24);

    let (status, swapped) = app.post(&format!("{base}/swap"), &owner, json!({ "a": 0, "b": 2 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(block_ids(&swapped), vec![ids[2].clone(), ids[1].clone(), ids[0].clone()]);

    let (_, moved) = app
        .post(&format!("{base}/move"), &owner, json!({ "block_id": ids[2], "to": 99 }))
        .await;
    assert_eq!(block_ids(&moved), vec![ids[1].clone(), ids[0].clone(), ids[2].clone()]);

    let (status, removed) = app.delete(&format!("{base}/{}", ids[1]), &owner).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(block_ids(&removed), vec![ids[0].clone(), ids[2].clone()]);

    let (status, _) = app.delete(&format!("{base}/{}", ids[1]), &owner).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.post(&format!("{base}/swap"), &owner, json!({ "a": 0, "b": 5 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reorder_twice_is_idempotent() {
    let app = TestApp::new();
    let owner = Owner::new();
    let campaign = create_campaign(
        &app,
        &owner,
        json!([{ "action": "view_profile" }, { "action": "endorse" }, { "action": "follow_up" }]),
    )
    .await;
    let uri = format!("/api/v1/campaigns/{}/blocks/reorder", campaign["id"].as_str().unwrap());

    let ids = block_ids(&campaign);
    let order = json!({ "order": [ids[2], ids[0], ids[1]] });

    let (status, first) = app.post(&uri, &owner, order.clone()).await;
    assert_eq!(status, StatusCode::OK);
    let (status, second) = app.post(&uri, &owner, order).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(first["blocks"], second["blocks"]);
    assert_eq!(block_ids(&second), vec![ids[2].clone(), ids[0].clone(), ids[1].clone()]);

    let (status, _) = app
        .post(&uri, &owner, json!({ "order": [ids[0], ids[0], ids[1]] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn saving_full_list_replaces_sequence() {
    let app = TestApp::new();
    let owner = Owner::new();
    let campaign = create_campaign(&app, &owner, json!([{ "action": "view_profile" }])).await;
    let uri = format!("/api/v1/campaigns/{}/blocks", campaign["id"].as_str().unwrap());

    let kept = block_ids(&campaign)[0].clone();
    let (status, saved) = app
        .put(
            &uri,
            &owner,
            json!({ "blocks": [{ "action": "endorse" }, { "id": kept, "action": "view_profile" }] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["blocks"].as_array().unwrap().len(), 2);
    assert_eq!(saved["blocks"][1]["id"], kept.as_str());
}

#[tokio::test]
async fn live_status_requires_blocks() {
    let app = TestApp::new();
    let owner = Owner::new();
    let empty = create_campaign(&app, &owner, json!([])).await;
    let status_uri = format!("/api/v1/campaigns/{}/status", empty["id"].as_str().unwrap());

    let (status, _) = app.put(&status_uri, &owner, json!({ "status": "active" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, paused) = app.put(&status_uri, &owner, json!({ "status": "paused" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paused["status"], "paused");

    let ready = create_campaign(&app, &owner, json!([{ "action": "endorse" }])).await;
    let ready_id = ready["id"].as_str().unwrap();
    let (status, running) = app
        .put(&format!("/api/v1/campaigns/{ready_id}/status"), &owner, json!({ "status": "running" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(running["status"], "running");

    let (_, filtered) = app.get("/api/v1/campaigns?status=running", &owner).await;
    assert_eq!(filtered.as_array().unwrap().len(), 1);

    let (_, stats) = app.get("/api/v1/dashboard/stats", &owner).await;
    assert_eq!(stats["campaigns"]["total"], 2);
    assert_eq!(stats["campaigns"]["running"], 1);
    assert_eq!(stats["campaigns"]["paused"], 1);
}

#[tokio::test]
async fn palette_lists_platform_actions() {
    let app = TestApp::new();
    let owner = Owner::new();

    let (status, palette) = app.get("/api/v1/campaigns/palette/email", &owner).await;
    assert_eq!(status, StatusCode::OK);
    let actions: Vec<&str> = palette
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["action"].as_str().unwrap())
        .collect();
    assert_eq!(actions, vec!["send_email", "follow_up", "wait"]);

    let (status, _) = app.get("/api/v1/campaigns/palette/myspace", &owner).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn campaign_cannot_reference_foreign_list() {
    let app = TestApp::new();
    let alice = Owner::new();
    let bob = Owner::new();

    let (_, list) = app.post("/api/v1/lists", &alice, json!({ "name": "Alice only" })).await;
    let (status, _) = app
        .post(
            "/api/v1/campaigns",
            &bob,
            json!({ "name": "Sneaky", "platform": "email", "list_id": list["id"] }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
