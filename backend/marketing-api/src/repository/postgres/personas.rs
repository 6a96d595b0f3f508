use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{parse_column, parse_optional_column};
use crate::error::{AppError, Result};
use crate::models::{KeywordTrigger, NewPersona, Persona, PersonaKind, PersonaPatch};
use crate::repository::PersonaRepository;

const PERSONA_COLUMNS: &str = "id, owner_id, kind, name, behavior, goal, tone, style, niche, \
     triggers, active, created_at, updated_at";

#[derive(Debug, FromRow)]
struct PersonaRow {
    id: Uuid,
    owner_id: Uuid,
    kind: String,
    name: String,
    behavior: String,
    goal: String,
    tone: Option<String>,
    style: Option<String>,
    niche: Option<String>,
    triggers: Json<Vec<KeywordTrigger>>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PersonaRow> for Persona {
    type Error = AppError;

    fn try_from(row: PersonaRow) -> Result<Self> {
        Ok(Persona {
            id: row.id,
            owner_id: row.owner_id,
            kind: parse_column("personas.kind", &row.kind)?,
            name: row.name,
            behavior: row.behavior,
            goal: row.goal,
            tone: parse_optional_column("personas.tone", row.tone.as_deref())?,
            style: parse_optional_column("personas.style", row.style.as_deref())?,
            niche: row.niche,
            triggers: row.triggers.0,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct PgPersonaRepository {
    pool: PgPool,
}

impl PgPersonaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PersonaRepository for PgPersonaRepository {
    async fn create(&self, owner_id: Uuid, persona: NewPersona) -> Result<Persona> {
        let query = format!(
            r#"
            INSERT INTO personas (id, owner_id, kind, name, behavior, goal, tone, style, niche, triggers, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            PERSONA_COLUMNS
        );

        let row: PersonaRow = sqlx::query_as(&query)
            .bind(Uuid::new_v4())
            .bind(owner_id)
            .bind(persona.kind.as_str())
            .bind(&persona.name)
            .bind(&persona.behavior)
            .bind(&persona.goal)
            .bind(persona.tone.map(|t| t.as_str()))
            .bind(persona.style.map(|s| s.as_str()))
            .bind(&persona.niche)
            .bind(Json(&persona.triggers))
            .bind(persona.active)
            .fetch_one(&self.pool)
            .await?;

        Persona::try_from(row)
    }

    async fn get(&self, owner_id: Uuid, kind: PersonaKind, id: Uuid) -> Result<Persona> {
        let query = format!(
            "SELECT {} FROM personas WHERE id = $1 AND owner_id = $2 AND kind = $3",
            PERSONA_COLUMNS
        );
        let row: PersonaRow = sqlx::query_as(&query)
            .bind(id)
            .bind(owner_id)
            .bind(kind.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found(kind.label(), id))?;

        Persona::try_from(row)
    }

    async fn list(&self, owner_id: Uuid, kind: PersonaKind) -> Result<Vec<Persona>> {
        let query = format!(
            "SELECT {} FROM personas WHERE owner_id = $1 AND kind = $2 ORDER BY created_at DESC",
            PERSONA_COLUMNS
        );
        let rows: Vec<PersonaRow> = sqlx::query_as(&query)
            .bind(owner_id)
            .bind(kind.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Persona::try_from).collect()
    }

    async fn update(
        &self,
        owner_id: Uuid,
        kind: PersonaKind,
        id: Uuid,
        patch: PersonaPatch,
    ) -> Result<Persona> {
        let mut persona = self.get(owner_id, kind, id).await?;
        patch.apply(&mut persona);

        let query = format!(
            r#"
            UPDATE personas
            SET name = $4, behavior = $5, goal = $6, tone = $7, style = $8, niche = $9,
                triggers = $10, active = $11, updated_at = NOW()
            WHERE id = $1 AND owner_id = $2 AND kind = $3
            RETURNING {}
            "#,
            PERSONA_COLUMNS
        );

        let row: PersonaRow = sqlx::query_as(&query)
            .bind(id)
            .bind(owner_id)
            .bind(kind.as_str())
            .bind(&persona.name)
            .bind(&persona.behavior)
            .bind(&persona.goal)
            .bind(persona.tone.map(|t| t.as_str()))
            .bind(persona.style.map(|s| s.as_str()))
            .bind(&persona.niche)
            .bind(Json(&persona.triggers))
            .bind(persona.active)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found(kind.label(), id))?;

        Persona::try_from(row)
    }

    async fn delete(&self, owner_id: Uuid, kind: PersonaKind, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM personas WHERE id = $1 AND owner_id = $2 AND kind = $3")
            .bind(id)
            .bind(owner_id)
            .bind(kind.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(kind.label(), id));
        }
        Ok(())
    }
}
