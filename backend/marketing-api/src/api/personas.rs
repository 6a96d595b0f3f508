// AI agents and creators share these handlers; the router for each kind
// carries its `PersonaKind` as an extension.
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{non_blank, parse_id, trimmed, trimmed_option};
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::{
    KeywordTrigger, NewPersona, Persona, PersonaKind, PersonaPatch, Style, Tone,
};
use crate::services::preview_reply;
use crate::AppState;

pub fn routes(kind: PersonaKind) -> Router<AppState> {
    Router::new()
        .route("/", get(list_personas).post(create_persona))
        .route(
            "/:id",
            get(get_persona).put(update_persona).delete(delete_persona),
        )
        .route("/:id/preview", post(preview))
        .layer(Extension(kind))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePersonaRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 5000))]
    #[serde(default)]
    pub behavior: String,
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub goal: String,
    pub tone: Option<Tone>,
    pub style: Option<Style>,
    #[validate(length(max = 200))]
    pub niche: Option<String>,
    #[validate(nested)]
    #[serde(default)]
    pub triggers: Vec<KeywordTrigger>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePersonaRequest {
    #[serde(default, deserialize_with = "trimmed_option")]
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 5000))]
    pub behavior: Option<String>,
    #[validate(length(max = 2000))]
    pub goal: Option<String>,
    pub tone: Option<Tone>,
    pub style: Option<Style>,
    #[serde(default, deserialize_with = "trimmed_option")]
    #[validate(length(min = 1, max = 200))]
    pub niche: Option<String>,
    #[validate(nested)]
    pub triggers: Option<Vec<KeywordTrigger>>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PreviewRequest {
    #[validate(length(min = 1, max = 5000))]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub matched: bool,
    pub keyword: Option<String>,
    pub reply: Option<String>,
}

/// Agents speak in a tone; creators write in a style about a niche.
fn check_kind_fields(kind: PersonaKind, payload: &CreatePersonaRequest) -> Result<()> {
    let missing = match kind {
        PersonaKind::Agent if payload.tone.is_none() => Some("tone"),
        PersonaKind::Creator if payload.style.is_none() => Some("style"),
        PersonaKind::Creator if non_blank(payload.niche.clone()).is_none() => Some("niche"),
        _ => None,
    };
    match missing {
        Some(field) => Err(AppError::BadRequest(format!(
            "{} is required for an {}",
            field,
            kind.label()
        ))),
        None => Ok(()),
    }
}

async fn list_personas(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Extension(kind): Extension<PersonaKind>,
) -> Result<Json<Vec<Persona>>> {
    Ok(Json(state.repos.personas.list(user.id, kind).await?))
}

async fn create_persona(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Extension(kind): Extension<PersonaKind>,
    Json(payload): Json<CreatePersonaRequest>,
) -> Result<(StatusCode, Json<Persona>)> {
    payload.validate()?;
    check_kind_fields(kind, &payload)?;

    let (tone, style, niche) = match kind {
        PersonaKind::Agent => (payload.tone, None, None),
        PersonaKind::Creator => (None, payload.style, non_blank(payload.niche)),
    };

    let persona = state
        .repos
        .personas
        .create(
            user.id,
            NewPersona {
                kind,
                name: payload.name,
                behavior: payload.behavior,
                goal: payload.goal,
                tone,
                style,
                niche,
                triggers: payload.triggers,
                active: payload.active,
            },
        )
        .await?;

    tracing::info!(persona_id = %persona.id, kind = %kind, "Persona created");
    Ok((StatusCode::CREATED, Json(persona)))
}

async fn get_persona(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Extension(kind): Extension<PersonaKind>,
    Path(id): Path<String>,
) -> Result<Json<Persona>> {
    let id = parse_id(&id, kind.as_str())?;
    Ok(Json(state.repos.personas.get(user.id, kind, id).await?))
}

async fn update_persona(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Extension(kind): Extension<PersonaKind>,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePersonaRequest>,
) -> Result<Json<Persona>> {
    let id = parse_id(&id, kind.as_str())?;
    payload.validate()?;

    let (tone, style, niche) = match kind {
        PersonaKind::Agent => (payload.tone, None, None),
        PersonaKind::Creator => (None, payload.style, payload.niche),
    };
    let patch = PersonaPatch {
        name: payload.name,
        behavior: payload.behavior,
        goal: payload.goal,
        tone,
        style,
        niche,
        triggers: payload.triggers,
        active: payload.active,
    };

    Ok(Json(state.repos.personas.update(user.id, kind, id, patch).await?))
}

async fn delete_persona(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Extension(kind): Extension<PersonaKind>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id(&id, kind.as_str())?;
    state.repos.personas.delete(user.id, kind, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn preview(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Extension(kind): Extension<PersonaKind>,
    Path(id): Path<String>,
    Json(payload): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>> {
    let id = parse_id(&id, kind.as_str())?;
    payload.validate()?;

    let persona = state.repos.personas.get(user.id, kind, id).await?;
    let response = match preview_reply(&persona, &payload.message) {
        Some(trigger) => PreviewResponse {
            matched: true,
            keyword: Some(trigger.keyword.clone()),
            reply: Some(trigger.response.clone()),
        },
        None => PreviewResponse {
            matched: false,
            keyword: None,
            reply: None,
        },
    };
    Ok(Json(response))
}
