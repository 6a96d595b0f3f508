use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::parse_column;
use crate::error::{AppError, Result};
use crate::models::{
    Block, Campaign, CampaignFilter, CampaignPatch, CampaignStats, CampaignStatus, NewCampaign,
};
use crate::repository::CampaignRepository;

const CAMPAIGN_COLUMNS: &str = "id, owner_id, name, platform, list_id, template_id, status, \
     blocks, stats, created_at, updated_at";

#[derive(Debug, FromRow)]
struct CampaignRow {
    id: Uuid,
    owner_id: Uuid,
    name: String,
    platform: String,
    list_id: Option<Uuid>,
    template_id: Option<Uuid>,
    status: String,
    blocks: Json<Vec<Block>>,
    stats: Json<CampaignStats>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CampaignRow> for Campaign {
    type Error = AppError;

    fn try_from(row: CampaignRow) -> Result<Self> {
        Ok(Campaign {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            platform: parse_column("campaigns.platform", &row.platform)?,
            list_id: row.list_id,
            template_id: row.template_id,
            status: parse_column("campaigns.status", &row.status)?,
            blocks: row.blocks.0,
            stats: row.stats.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct PgCampaignRepository {
    pool: PgPool,
}

impl PgCampaignRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CampaignRepository for PgCampaignRepository {
    async fn create(&self, owner_id: Uuid, campaign: NewCampaign) -> Result<Campaign> {
        let query = format!(
            r#"
            INSERT INTO campaigns (id, owner_id, name, platform, list_id, template_id, status, blocks, stats)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            CAMPAIGN_COLUMNS
        );

        let row: CampaignRow = sqlx::query_as(&query)
            .bind(Uuid::new_v4())
            .bind(owner_id)
            .bind(&campaign.name)
            .bind(campaign.platform.as_str())
            .bind(campaign.list_id)
            .bind(campaign.template_id)
            .bind(CampaignStatus::Draft.as_str())
            .bind(Json(&campaign.blocks))
            .bind(Json(CampaignStats::default()))
            .fetch_one(&self.pool)
            .await?;

        Campaign::try_from(row)
    }

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Campaign> {
        let query = format!(
            "SELECT {} FROM campaigns WHERE id = $1 AND owner_id = $2",
            CAMPAIGN_COLUMNS
        );
        let row: CampaignRow = sqlx::query_as(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("Campaign", id))?;

        Campaign::try_from(row)
    }

    async fn list(&self, owner_id: Uuid, filter: &CampaignFilter) -> Result<Vec<Campaign>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM campaigns WHERE owner_id = ",
            CAMPAIGN_COLUMNS
        ));
        builder.push_bind(owner_id);

        if let Some(platform) = filter.platform {
            builder.push(" AND platform = ").push_bind(platform.as_str());
        }
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(list_id) = filter.list_id {
            builder.push(" AND list_id = ").push_bind(list_id);
        }
        builder.push(" ORDER BY created_at DESC");

        let rows: Vec<CampaignRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(Campaign::try_from).collect()
    }

    async fn update(&self, owner_id: Uuid, id: Uuid, patch: CampaignPatch) -> Result<Campaign> {
        let mut campaign = self.get(owner_id, id).await?;
        patch.apply(&mut campaign);

        let query = format!(
            r#"
            UPDATE campaigns
            SET name = $3, list_id = $4, template_id = $5, status = $6, blocks = $7,
                updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING {}
            "#,
            CAMPAIGN_COLUMNS
        );

        let row: CampaignRow = sqlx::query_as(&query)
            .bind(id)
            .bind(owner_id)
            .bind(&campaign.name)
            .bind(campaign.list_id)
            .bind(campaign.template_id)
            .bind(campaign.status.as_str())
            .bind(Json(&campaign.blocks))
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("Campaign", id))?;

        Campaign::try_from(row)
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM campaigns WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Campaign", id));
        }
        Ok(())
    }
}
