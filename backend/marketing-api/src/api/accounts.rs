use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use validator::Validate;

use super::{parse_id, parse_param, trimmed};
use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::{Account, NewAccount, Platform};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_accounts).post(connect_account))
        .route("/:id", get(get_account).delete(delete_account))
        .route("/:id/reconnect", post(reconnect_account))
}

#[derive(Debug, Deserialize)]
pub struct ListAccountsQuery {
    pub platform: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ConnectAccountRequest {
    pub platform: Platform,
    #[serde(deserialize_with = "trimmed")]
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ReconnectRequest {
    #[serde(default)]
    pub password: String,
}

async fn list_accounts(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListAccountsQuery>,
) -> Result<Json<Vec<Account>>> {
    let platform = parse_param(query.platform.as_deref(), "platform")?;
    Ok(Json(state.repos.accounts.list(user.id, platform).await?))
}

/// Runs the simulated login and stores the account whatever the outcome, so
/// a failed attempt stays visible with its reason.
async fn connect_account(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<ConnectAccountRequest>,
) -> Result<(StatusCode, Json<Account>)> {
    payload.validate()?;
    let email = payload.email;

    let outcome = state
        .connector
        .connect(payload.platform, &email, &payload.password)
        .await;

    let account = state
        .repos
        .accounts
        .create(
            user.id,
            NewAccount {
                platform: payload.platform,
                email,
                outcome,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(account)))
}

async fn get_account(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Account>> {
    let id = parse_id(&id, "account")?;
    Ok(Json(state.repos.accounts.get(user.id, id).await?))
}

async fn reconnect_account(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<ReconnectRequest>,
) -> Result<Json<Account>> {
    let id = parse_id(&id, "account")?;
    let account = state.repos.accounts.get(user.id, id).await?;

    let outcome = state
        .connector
        .connect(account.platform, &account.email, &payload.password)
        .await;

    Ok(Json(
        state.repos.accounts.record_outcome(user.id, id, outcome).await?,
    ))
}

async fn delete_account(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id(&id, "account")?;
    state.repos.accounts.delete(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
