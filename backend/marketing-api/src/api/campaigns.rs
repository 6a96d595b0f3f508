use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{double_option, non_blank, parse_id, parse_param, trimmed, trimmed_option};
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::{
    BlockAction, BlockDraft, Campaign, CampaignFilter, CampaignPatch, CampaignStats,
    CampaignStatus, NewCampaign, Platform,
};
use crate::services::Sequence;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_campaigns).post(create_campaign))
        .route("/palette/:platform", get(get_palette))
        .route(
            "/:id",
            get(get_campaign).put(update_campaign).delete(delete_campaign),
        )
        .route("/:id/status", put(update_status))
        .route("/:id/stats", get(get_stats))
        .route("/:id/blocks", put(save_blocks).post(append_block))
        .route("/:id/blocks/swap", post(swap_blocks))
        .route("/:id/blocks/move", post(move_block))
        .route("/:id/blocks/reorder", post(reorder_blocks))
        .route("/:id/blocks/:block_id", delete(remove_block))
}

#[derive(Debug, Deserialize)]
pub struct ListCampaignsQuery {
    pub platform: Option<String>,
    pub status: Option<String>,
    pub list_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCampaignRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub platform: Platform,
    pub list_id: Option<Uuid>,
    pub template_id: Option<Uuid>,
    #[serde(default)]
    pub blocks: Vec<BlockDraft>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCampaignRequest {
    #[serde(default, deserialize_with = "trimmed_option")]
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub list_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    pub template_id: Option<Option<Uuid>>,
    pub status: Option<CampaignStatus>,
    pub blocks: Option<Vec<BlockDraft>>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: CampaignStatus,
}

#[derive(Debug, Deserialize)]
pub struct SaveBlocksRequest {
    pub blocks: Vec<BlockDraft>,
}

#[derive(Debug, Deserialize)]
pub struct SwapRequest {
    pub a: usize,
    pub b: usize,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub block_id: Uuid,
    pub to: usize,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub order: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct PaletteEntry {
    pub action: BlockAction,
    pub label: &'static str,
}

/// A live campaign must have something to run.
fn ensure_runnable(status: CampaignStatus, block_count: usize) -> Result<()> {
    if status.is_live() && block_count == 0 {
        return Err(AppError::BadRequest(format!(
            "A campaign needs at least one block before it can be {}",
            status
        )));
    }
    Ok(())
}

/// Owner-scoped existence check for the optional list/template references.
async fn check_references(
    state: &AppState,
    owner_id: Uuid,
    list_id: Option<Uuid>,
    template_id: Option<Uuid>,
) -> Result<()> {
    if let Some(list_id) = list_id {
        state.repos.lists.get(owner_id, list_id).await?;
    }
    if let Some(template_id) = template_id {
        state.repos.templates.get(owner_id, template_id).await?;
    }
    Ok(())
}

async fn list_campaigns(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListCampaignsQuery>,
) -> Result<Json<Vec<Campaign>>> {
    let list_id = match non_blank(query.list_id) {
        Some(raw) => Some(parse_id(&raw, "list")?),
        None => None,
    };
    let filter = CampaignFilter {
        platform: parse_param(query.platform.as_deref(), "platform")?,
        status: parse_param(query.status.as_deref(), "status")?,
        list_id,
    };

    Ok(Json(state.repos.campaigns.list(user.id, &filter).await?))
}

async fn create_campaign(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateCampaignRequest>,
) -> Result<(StatusCode, Json<Campaign>)> {
    payload.validate()?;
    check_references(&state, user.id, payload.list_id, payload.template_id).await?;
    let sequence = Sequence::from_drafts(payload.blocks)?;

    let campaign = state
        .repos
        .campaigns
        .create(
            user.id,
            NewCampaign {
                name: payload.name,
                platform: payload.platform,
                list_id: payload.list_id,
                template_id: payload.template_id,
                blocks: sequence.into_blocks(),
            },
        )
        .await?;

    tracing::info!(
        campaign_id = %campaign.id,
        platform = %campaign.platform,
        blocks = campaign.blocks.len(),
        "Campaign created"
    );
    Ok((StatusCode::CREATED, Json(campaign)))
}

async fn get_campaign(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Campaign>> {
    let id = parse_id(&id, "campaign")?;
    Ok(Json(state.repos.campaigns.get(user.id, id).await?))
}

async fn update_campaign(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCampaignRequest>,
) -> Result<Json<Campaign>> {
    let id = parse_id(&id, "campaign")?;
    payload.validate()?;

    let current = state.repos.campaigns.get(user.id, id).await?;
    check_references(
        &state,
        user.id,
        payload.list_id.flatten(),
        payload.template_id.flatten(),
    )
    .await?;

    let blocks = match payload.blocks {
        Some(drafts) => Some(Sequence::from_drafts(drafts)?.into_blocks()),
        None => None,
    };
    let status = payload.status.unwrap_or(current.status);
    let block_count = blocks.as_ref().map_or(current.blocks.len(), Vec::len);
    ensure_runnable(status, block_count)?;

    let patch = CampaignPatch {
        name: payload.name,
        list_id: payload.list_id,
        template_id: payload.template_id,
        status: payload.status,
        blocks,
    };
    Ok(Json(state.repos.campaigns.update(user.id, id, patch).await?))
}

async fn delete_campaign(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id(&id, "campaign")?;
    state.repos.campaigns.delete(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_status(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<StatusRequest>,
) -> Result<Json<Campaign>> {
    let id = parse_id(&id, "campaign")?;
    let current = state.repos.campaigns.get(user.id, id).await?;
    ensure_runnable(payload.status, current.blocks.len())?;

    let patch = CampaignPatch {
        status: Some(payload.status),
        ..Default::default()
    };
    let campaign = state.repos.campaigns.update(user.id, id, patch).await?;

    tracing::info!(
        campaign_id = %id,
        from = %current.status,
        to = %campaign.status,
        "Campaign status changed"
    );
    Ok(Json(campaign))
}

async fn get_stats(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<CampaignStats>> {
    let id = parse_id(&id, "campaign")?;
    Ok(Json(state.repos.campaigns.get(user.id, id).await?.stats))
}

async fn get_palette(Path(platform): Path<String>) -> Result<Json<Vec<PaletteEntry>>> {
    let platform: Platform = platform.parse().map_err(AppError::BadRequest)?;
    Ok(Json(
        platform
            .palette()
            .iter()
            .map(|action| PaletteEntry {
                action: *action,
                label: action.default_label(),
            })
            .collect(),
    ))
}

/// Loads a campaign's sequence, applies `edit`, and persists the result.
async fn edit_sequence<F>(state: &AppState, owner_id: Uuid, raw_id: &str, edit: F) -> Result<Campaign>
where
    F: FnOnce(&mut Sequence) -> Result<()>,
{
    let id = parse_id(raw_id, "campaign")?;
    let campaign = state.repos.campaigns.get(owner_id, id).await?;

    let mut sequence = Sequence::from(campaign.blocks);
    edit(&mut sequence)?;
    ensure_runnable(campaign.status, sequence.len())?;

    let patch = CampaignPatch {
        blocks: Some(sequence.into_blocks()),
        ..Default::default()
    };
    state.repos.campaigns.update(owner_id, id, patch).await
}

async fn save_blocks(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<SaveBlocksRequest>,
) -> Result<Json<Campaign>> {
    let replacement = Sequence::from_drafts(payload.blocks)?;
    let campaign = edit_sequence(&state, user.id, &id, |sequence| {
        *sequence = replacement;
        Ok(())
    })
    .await?;
    Ok(Json(campaign))
}

async fn append_block(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(draft): Json<BlockDraft>,
) -> Result<(StatusCode, Json<Campaign>)> {
    let campaign = edit_sequence(&state, user.id, &id, |sequence| {
        sequence.append(draft).map(|_| ())
    })
    .await?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

async fn remove_block(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((id, block_id)): Path<(String, String)>,
) -> Result<Json<Campaign>> {
    let block_id = parse_id(&block_id, "block")?;
    let campaign = edit_sequence(&state, user.id, &id, |sequence| {
        sequence.remove(block_id).map(|_| ())
    })
    .await?;
    Ok(Json(campaign))
}

async fn swap_blocks(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<SwapRequest>,
) -> Result<Json<Campaign>> {
    let campaign = edit_sequence(&state, user.id, &id, |sequence| {
        sequence.swap(payload.a, payload.b)
    })
    .await?;
    Ok(Json(campaign))
}

async fn move_block(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<MoveRequest>,
) -> Result<Json<Campaign>> {
    let campaign = edit_sequence(&state, user.id, &id, |sequence| {
        sequence.move_block(payload.block_id, payload.to)
    })
    .await?;
    Ok(Json(campaign))
}

async fn reorder_blocks(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<ReorderRequest>,
) -> Result<Json<Campaign>> {
    let campaign = edit_sequence(&state, user.id, &id, |sequence| {
        sequence.reorder(&payload.order)
    })
    .await?;
    Ok(Json(campaign))
}
