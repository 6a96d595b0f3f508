use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{double_option, non_blank, parse_id, trimmed, trimmed_option};
use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::{normalize_segments, Contact, ContactFilter, ContactPatch, NewContact, SocialHandles};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_contacts).post(create_contact))
        .route(
            "/:id",
            get(get_contact).put(update_contact).delete(delete_contact),
        )
}

#[derive(Debug, Deserialize)]
pub struct ListContactsQuery {
    pub list_id: Option<String>,
    pub segment: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateContactRequest {
    pub list_id: Option<Uuid>,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[serde(default)]
    pub social: SocialHandles,
    #[serde(default)]
    pub segments: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateContactRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub list_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "trimmed_option")]
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "trimmed_option")]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    pub social: Option<SocialHandles>,
    pub segments: Option<Vec<String>>,
}

async fn list_contacts(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListContactsQuery>,
) -> Result<Json<Vec<Contact>>> {
    let list_id = match non_blank(query.list_id) {
        Some(raw) => Some(parse_id(&raw, "list")?),
        None => None,
    };
    let filter = ContactFilter {
        list_id,
        segment: non_blank(query.segment),
        search: non_blank(query.search),
    };

    let contacts = state.repos.contacts.list(user.id, &filter).await?;
    Ok(Json(contacts))
}

async fn create_contact(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateContactRequest>,
) -> Result<(StatusCode, Json<Contact>)> {
    payload.validate()?;

    let contact = state
        .repos
        .contacts
        .create(
            user.id,
            NewContact {
                list_id: payload.list_id,
                name: payload.name,
                email: payload.email,
                phone: non_blank(payload.phone),
                social: payload.social,
                segments: normalize_segments(&payload.segments),
            },
        )
        .await?;

    tracing::info!(contact_id = %contact.id, owner_id = %user.id, "Contact created");
    Ok((StatusCode::CREATED, Json(contact)))
}

async fn get_contact(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Contact>> {
    let id = parse_id(&id, "contact")?;
    Ok(Json(state.repos.contacts.get(user.id, id).await?))
}

async fn update_contact(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateContactRequest>,
) -> Result<Json<Contact>> {
    let id = parse_id(&id, "contact")?;
    payload.validate()?;

    let patch = ContactPatch {
        list_id: payload.list_id,
        name: payload.name,
        email: payload.email,
        phone: payload.phone.map(non_blank),
        social: payload.social,
        segments: payload.segments.map(normalize_segments),
    };

    Ok(Json(state.repos.contacts.update(user.id, id, patch).await?))
}

async fn delete_contact(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id(&id, "contact")?;
    state.repos.contacts.delete(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
