pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod services;

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::repository::Repositories;
use crate::services::AccountConnector;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub repos: Repositories,
    pub connector: AccountConnector,
}

impl AppState {
    pub fn new(config: Config, repos: Repositories) -> Self {
        let connector = AccountConnector::new(&config.connector);
        Self {
            config,
            repos,
            connector,
        }
    }
}

/// Full HTTP surface: `/health` plus the bearer-protected `/api/v1` tree.
pub fn build_router(state: AppState) -> Router {
    let api = api::routes().route_layer(axum::middleware::from_fn_with_state(
        state.clone(),
        middleware::require_auth,
    ));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api)
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
