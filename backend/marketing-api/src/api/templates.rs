use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use validator::Validate;

use super::{double_option, non_blank, parse_id, parse_param, trimmed, trimmed_option};
use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::{NewTemplate, Platform, Template, TemplatePatch};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_templates).post(create_template))
        .route(
            "/:id",
            get(get_template).put(update_template).delete(delete_template),
        )
}

#[derive(Debug, Deserialize)]
pub struct ListTemplatesQuery {
    pub platform: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTemplateRequest {
    pub platform: Platform,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 300))]
    pub subject: Option<String>,
    #[validate(length(min = 1, max = 20000))]
    pub body: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTemplateRequest {
    pub platform: Option<Platform>,
    #[serde(default, deserialize_with = "trimmed_option")]
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub subject: Option<Option<String>>,
    #[validate(length(min = 1, max = 20000))]
    pub body: Option<String>,
}

async fn list_templates(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListTemplatesQuery>,
) -> Result<Json<Vec<Template>>> {
    let platform = parse_param(query.platform.as_deref(), "platform")?;
    Ok(Json(state.repos.templates.list(user.id, platform).await?))
}

async fn create_template(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<Template>)> {
    payload.validate()?;

    let template = state
        .repos
        .templates
        .create(
            user.id,
            NewTemplate {
                platform: payload.platform,
                name: payload.name,
                subject: non_blank(payload.subject),
                body: payload.body,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(template)))
}

async fn get_template(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Template>> {
    let id = parse_id(&id, "template")?;
    Ok(Json(state.repos.templates.get(user.id, id).await?))
}

async fn update_template(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateTemplateRequest>,
) -> Result<Json<Template>> {
    let id = parse_id(&id, "template")?;
    payload.validate()?;

    let patch = TemplatePatch {
        platform: payload.platform,
        name: payload.name,
        subject: payload.subject.map(non_blank),
        body: payload.body,
    };
    Ok(Json(state.repos.templates.update(user.id, id, patch).await?))
}

async fn delete_template(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id(&id, "template")?;
    state.repos.templates.delete(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
