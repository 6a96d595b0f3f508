use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

use super::{double_option, non_blank, parse_id, trimmed, trimmed_option};
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::{Contact, ContactFilter, ContactList, ListPatch, NewList};
use crate::repository::ImportTarget;
use crate::services::{ImportFormat, SpreadsheetImporter};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_lists).post(create_list))
        .route("/import", post(import_new_list))
        .route("/:id", get(get_list).put(update_list).delete(delete_list))
        .route("/:id/contacts", get(list_members))
        .route("/:id/import", post(import_into_list))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateListRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 100))]
    pub segment: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateListRequest {
    #[serde(default, deserialize_with = "trimmed_option")]
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub segment: Option<Option<String>>,
}

#[derive(Debug, Serialize)]
pub struct DeleteListResponse {
    pub deleted_contacts: u64,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub list: ContactList,
    pub imported: usize,
}

async fn list_lists(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<ContactList>>> {
    Ok(Json(state.repos.lists.list(user.id).await?))
}

async fn create_list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateListRequest>,
) -> Result<(StatusCode, Json<ContactList>)> {
    payload.validate()?;

    let list = state
        .repos
        .lists
        .create(
            user.id,
            NewList {
                name: payload.name,
                segment: non_blank(payload.segment),
            },
        )
        .await?;

    tracing::info!(list_id = %list.id, owner_id = %user.id, "List created");
    Ok((StatusCode::CREATED, Json(list)))
}

async fn get_list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<ContactList>> {
    let id = parse_id(&id, "list")?;
    Ok(Json(state.repos.lists.get(user.id, id).await?))
}

async fn update_list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateListRequest>,
) -> Result<Json<ContactList>> {
    let id = parse_id(&id, "list")?;
    payload.validate()?;

    let patch = ListPatch {
        name: payload.name,
        segment: payload.segment.map(non_blank),
    };
    Ok(Json(state.repos.lists.update(user.id, id, patch).await?))
}

async fn delete_list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<DeleteListResponse>> {
    let id = parse_id(&id, "list")?;
    let deleted_contacts = state.repos.lists.delete(user.id, id).await?;

    tracing::info!(list_id = %id, deleted_contacts, "List deleted");
    Ok(Json(DeleteListResponse { deleted_contacts }))
}

async fn list_members(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Contact>>> {
    let id = parse_id(&id, "list")?;
    // 404 for unknown or foreign lists rather than an empty page
    state.repos.lists.get(user.id, id).await?;

    let filter = ContactFilter {
        list_id: Some(id),
        ..Default::default()
    };
    Ok(Json(state.repos.contacts.list(user.id, &filter).await?))
}

/// A multipart upload: the `file` part plus any plain text fields.
struct Upload {
    data: Vec<u8>,
    file_name: Option<String>,
    content_type: Option<String>,
    fields: HashMap<String, String>,
}

impl Upload {
    async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut file = None;
        let mut fields = HashMap::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("Malformed upload: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "file" {
                let file_name = field.file_name().map(String::from);
                let content_type = field.content_type().map(String::from);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Unreadable file: {}", e)))?;
                file = Some((data.to_vec(), file_name, content_type));
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Unreadable field {}: {}", name, e)))?;
                fields.insert(name, value);
            }
        }

        let (data, file_name, content_type) =
            file.ok_or_else(|| AppError::BadRequest("A 'file' part is required".to_string()))?;

        Ok(Self {
            data,
            file_name,
            content_type,
            fields,
        })
    }

    fn field(&self, name: &str) -> Option<String> {
        non_blank(self.fields.get(name).cloned())
    }

    fn format(&self) -> ImportFormat {
        ImportFormat::detect(
            self.file_name.as_deref(),
            self.content_type.as_deref(),
            &self.data,
        )
    }
}

async fn run_import(
    state: &AppState,
    user: &CurrentUser,
    upload: Upload,
    target: ImportTarget,
) -> Result<(StatusCode, Json<ImportResponse>)> {
    let segment = upload.field("segment");
    let importer = SpreadsheetImporter::new(state.config.import.max_rows);
    let contacts = importer.contacts_from_upload(upload.format(), &upload.data, segment.as_deref())?;

    let summary = state.repos.lists.import(user.id, target, contacts).await?;

    tracing::info!(
        list_id = %summary.list.id,
        owner_id = %user.id,
        imported = summary.imported,
        "Contacts imported"
    );
    Ok((
        StatusCode::CREATED,
        Json(ImportResponse {
            list: summary.list,
            imported: summary.imported,
        }),
    ))
}

async fn import_new_list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ImportResponse>)> {
    let upload = Upload::read(multipart).await?;
    let name = upload
        .field("list_name")
        .ok_or_else(|| AppError::BadRequest("list_name is required".to_string()))?;

    let target = ImportTarget::NewList(NewList {
        name,
        segment: upload.field("segment"),
    });
    run_import(&state, &user, upload, target).await
}

async fn import_into_list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ImportResponse>)> {
    let id = parse_id(&id, "list")?;
    let upload = Upload::read(multipart).await?;
    run_import(&state, &user, upload, ImportTarget::Existing(id)).await
}
