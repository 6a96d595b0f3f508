use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Contact, ContactFilter, ContactPatch, NewContact, SocialHandles};
use crate::repository::ContactRepository;

pub(super) const CONTACT_COLUMNS: &str = "id, owner_id, list_id, name, email, phone, \
     facebook, instagram, linkedin, twitter, segments, created_at, updated_at";

#[derive(Debug, FromRow)]
pub(super) struct ContactRow {
    id: Uuid,
    owner_id: Uuid,
    list_id: Option<Uuid>,
    name: String,
    email: String,
    phone: Option<String>,
    facebook: Option<String>,
    instagram: Option<String>,
    linkedin: Option<String>,
    twitter: Option<String>,
    segments: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ContactRow> for Contact {
    fn from(row: ContactRow) -> Self {
        Contact {
            id: row.id,
            owner_id: row.owner_id,
            list_id: row.list_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            social: SocialHandles {
                facebook: row.facebook,
                instagram: row.instagram,
                linkedin: row.linkedin,
                twitter: row.twitter,
            },
            segments: row.segments,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Inserts one contact on any executor so imports can reuse it inside a
/// transaction.
pub(super) async fn insert_contact<'e, E>(
    executor: E,
    owner_id: Uuid,
    contact: &NewContact,
) -> Result<Contact>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let query = format!(
        r#"
        INSERT INTO contacts (id, owner_id, list_id, name, email, phone,
                              facebook, instagram, linkedin, twitter, segments)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING {}
        "#,
        CONTACT_COLUMNS
    );

    let row: ContactRow = sqlx::query_as(&query)
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(contact.list_id)
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(&contact.social.facebook)
        .bind(&contact.social.instagram)
        .bind(&contact.social.linkedin)
        .bind(&contact.social.twitter)
        .bind(&contact.segments)
        .fetch_one(executor)
        .await?;

    Ok(row.into())
}

pub(super) async fn list_owned_by<'e, E>(executor: E, owner_id: Uuid, list_id: Uuid) -> Result<bool>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM contact_lists WHERE id = $1 AND owner_id = $2)",
    )
    .bind(list_id)
    .bind(owner_id)
    .fetch_one(executor)
    .await?;

    Ok(exists)
}

pub struct PgContactRepository {
    pool: PgPool,
}

impl PgContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_list(&self, owner_id: Uuid, list_id: Uuid) -> Result<()> {
        if !list_owned_by(&self.pool, owner_id, list_id).await? {
            return Err(AppError::not_found("List", list_id));
        }
        Ok(())
    }
}

#[async_trait]
impl ContactRepository for PgContactRepository {
    async fn create(&self, owner_id: Uuid, contact: NewContact) -> Result<Contact> {
        if let Some(list_id) = contact.list_id {
            self.ensure_list(owner_id, list_id).await?;
        }
        let contact = insert_contact(&self.pool, owner_id, &contact).await?;
        tracing::debug!(contact_id = %contact.id, owner_id = %owner_id, "Contact created");
        Ok(contact)
    }

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Contact> {
        let query = format!(
            "SELECT {} FROM contacts WHERE id = $1 AND owner_id = $2",
            CONTACT_COLUMNS
        );
        let row: ContactRow = sqlx::query_as(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("Contact", id))?;

        Ok(row.into())
    }

    async fn list(&self, owner_id: Uuid, filter: &ContactFilter) -> Result<Vec<Contact>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM contacts WHERE owner_id = ",
            CONTACT_COLUMNS
        ));
        builder.push_bind(owner_id);

        if let Some(list_id) = filter.list_id {
            builder.push(" AND list_id = ").push_bind(list_id);
        }
        if let Some(ref segment) = filter.segment {
            builder
                .push(" AND EXISTS (SELECT 1 FROM unnest(segments) s WHERE lower(s) = lower(")
                .push_bind(segment.clone())
                .push("))");
        }
        if let Some(ref search) = filter.search {
            let pattern = format!("%{}%", search.replace('%', "\\%").replace('_', "\\_"));
            builder
                .push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR email ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        builder.push(" ORDER BY created_at DESC");

        let rows: Vec<ContactRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Contact::from).collect())
    }

    async fn update(&self, owner_id: Uuid, id: Uuid, patch: ContactPatch) -> Result<Contact> {
        if let Some(Some(list_id)) = patch.list_id {
            self.ensure_list(owner_id, list_id).await?;
        }

        let mut contact = self.get(owner_id, id).await?;
        patch.apply(&mut contact);

        let query = format!(
            r#"
            UPDATE contacts
            SET list_id = $3, name = $4, email = $5, phone = $6,
                facebook = $7, instagram = $8, linkedin = $9, twitter = $10,
                segments = $11, updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING {}
            "#,
            CONTACT_COLUMNS
        );

        let row: ContactRow = sqlx::query_as(&query)
            .bind(id)
            .bind(owner_id)
            .bind(contact.list_id)
            .bind(&contact.name)
            .bind(&contact.email)
            .bind(&contact.phone)
            .bind(&contact.social.facebook)
            .bind(&contact.social.instagram)
            .bind(&contact.social.linkedin)
            .bind(&contact.social.twitter)
            .bind(&contact.segments)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("Contact", id))?;

        Ok(row.into())
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Contact", id));
        }
        Ok(())
    }
}
