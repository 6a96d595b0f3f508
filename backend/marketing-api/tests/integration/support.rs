use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use marketing_api::config::Config;
use marketing_api::middleware::issue_token;
use marketing_api::repository::Repositories;
use marketing_api::{build_router, AppState};

pub const SECRET: &str = "integration-test-secret";
const BOUNDARY: &str = "----marketing-api-test-boundary";

pub struct TestApp {
    router: Router,
}

/// A caller with its own bearer token.
pub struct Owner {
    pub id: Uuid,
    pub token: String,
}

impl Owner {
    pub fn new() -> Self {
        let id = Uuid::new_v4();
        let token = issue_token(SECRET, id, "owner@example.com", 1).unwrap();
        Self { id, token }
    }
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState::new(Config::in_memory(SECRET), Repositories::in_memory());
        Self {
            router: build_router(state),
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, owner: &Owner) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(&owner.token), None).await
    }

    pub async fn post(&self, uri: &str, owner: &Owner, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(&owner.token), Some(body))
            .await
    }

    pub async fn put(&self, uri: &str, owner: &Owner, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(&owner.token), Some(body))
            .await
    }

    pub async fn delete(&self, uri: &str, owner: &Owner) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(&owner.token), None)
            .await
    }

    /// Posts a multipart form with text `fields` and a `file` part.
    pub async fn upload(
        &self,
        uri: &str,
        owner: &Owner,
        fields: &[(&str, &str)],
        file_name: &str,
        file: &str,
    ) -> (StatusCode, Value) {
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n{file}\r\n--{BOUNDARY}--\r\n"
        ));

        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", owner.token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }
}

pub fn csv_rows(n: usize) -> String {
    let mut csv = String::from("name,email,segments\n");
    for i in 0..n {
        csv.push_str(&format!("Lead {i},lead{i}@example.com,prospect\n"));
    }
    csv
}
