use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::parse_column;
use crate::error::{AppError, Result};
use crate::models::{NewTemplate, Platform, Template, TemplatePatch};
use crate::repository::TemplateRepository;

const TEMPLATE_COLUMNS: &str = "id, owner_id, platform, name, subject, body, created_at, updated_at";

#[derive(Debug, FromRow)]
struct TemplateRow {
    id: Uuid,
    owner_id: Uuid,
    platform: String,
    name: String,
    subject: Option<String>,
    body: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TemplateRow> for Template {
    type Error = AppError;

    fn try_from(row: TemplateRow) -> Result<Self> {
        Ok(Template {
            id: row.id,
            owner_id: row.owner_id,
            platform: parse_column("message_templates.platform", &row.platform)?,
            name: row.name,
            subject: row.subject,
            body: row.body,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct PgTemplateRepository {
    pool: PgPool,
}

impl PgTemplateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TemplateRepository for PgTemplateRepository {
    async fn create(&self, owner_id: Uuid, template: NewTemplate) -> Result<Template> {
        let query = format!(
            r#"
            INSERT INTO message_templates (id, owner_id, platform, name, subject, body)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            TEMPLATE_COLUMNS
        );

        let row: TemplateRow = sqlx::query_as(&query)
            .bind(Uuid::new_v4())
            .bind(owner_id)
            .bind(template.platform.as_str())
            .bind(&template.name)
            .bind(&template.subject)
            .bind(&template.body)
            .fetch_one(&self.pool)
            .await?;

        Template::try_from(row)
    }

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Template> {
        let query = format!(
            "SELECT {} FROM message_templates WHERE id = $1 AND owner_id = $2",
            TEMPLATE_COLUMNS
        );
        let row: TemplateRow = sqlx::query_as(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("Template", id))?;

        Template::try_from(row)
    }

    async fn list(&self, owner_id: Uuid, platform: Option<Platform>) -> Result<Vec<Template>> {
        let query = format!(
            r#"
            SELECT {} FROM message_templates
            WHERE owner_id = $1 AND ($2::TEXT IS NULL OR platform = $2)
            ORDER BY created_at DESC
            "#,
            TEMPLATE_COLUMNS
        );
        let rows: Vec<TemplateRow> = sqlx::query_as(&query)
            .bind(owner_id)
            .bind(platform.map(|p| p.as_str()))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Template::try_from).collect()
    }

    async fn update(&self, owner_id: Uuid, id: Uuid, patch: TemplatePatch) -> Result<Template> {
        let mut template = self.get(owner_id, id).await?;
        patch.apply(&mut template);

        let query = format!(
            r#"
            UPDATE message_templates
            SET platform = $3, name = $4, subject = $5, body = $6, updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING {}
            "#,
            TEMPLATE_COLUMNS
        );

        let row: TemplateRow = sqlx::query_as(&query)
            .bind(id)
            .bind(owner_id)
            .bind(template.platform.as_str())
            .bind(&template.name)
            .bind(&template.subject)
            .bind(&template.body)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("Template", id))?;

        Template::try_from(row)
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM message_templates WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Template", id));
        }
        Ok(())
    }
}
