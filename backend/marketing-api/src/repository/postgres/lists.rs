use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::contacts::{insert_contact, list_owned_by};
use crate::error::{AppError, Result};
use crate::models::{ContactList, ListPatch, NewContact, NewList};
use crate::repository::{ImportSummary, ImportTarget, ListRepository};

const LIST_SELECT: &str = r#"
    SELECT
        l.id,
        l.owner_id,
        l.name,
        l.segment,
        (SELECT COUNT(*) FROM contacts c WHERE c.list_id = l.id) AS contact_count,
        l.created_at,
        l.updated_at
    FROM contact_lists l
"#;

#[derive(Debug, FromRow)]
struct ListRow {
    id: Uuid,
    owner_id: Uuid,
    name: String,
    segment: Option<String>,
    contact_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ListRow> for ContactList {
    fn from(row: ListRow) -> Self {
        ContactList {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            segment: row.segment,
            contact_count: row.contact_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub struct PgListRepository {
    pool: PgPool,
}

impl PgListRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListRepository for PgListRepository {
    async fn create(&self, owner_id: Uuid, list: NewList) -> Result<ContactList> {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO contact_lists (id, owner_id, name, segment) VALUES ($1, $2, $3, $4)")
            .bind(id)
            .bind(owner_id)
            .bind(&list.name)
            .bind(&list.segment)
            .execute(&self.pool)
            .await?;

        self.get(owner_id, id).await
    }

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<ContactList> {
        let query = format!("{} WHERE l.id = $1 AND l.owner_id = $2", LIST_SELECT);
        let row: ListRow = sqlx::query_as(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("List", id))?;

        Ok(row.into())
    }

    async fn list(&self, owner_id: Uuid) -> Result<Vec<ContactList>> {
        let query = format!("{} WHERE l.owner_id = $1 ORDER BY l.created_at DESC", LIST_SELECT);
        let rows: Vec<ListRow> = sqlx::query_as(&query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ContactList::from).collect())
    }

    async fn update(&self, owner_id: Uuid, id: Uuid, patch: ListPatch) -> Result<ContactList> {
        let mut list = self.get(owner_id, id).await?;
        patch.apply(&mut list);

        sqlx::query(
            r#"
            UPDATE contact_lists
            SET name = $3, segment = $4, updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(&list.name)
        .bind(&list.segment)
        .execute(&self.pool)
        .await?;

        self.get(owner_id, id).await
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        let contacts = sqlx::query("DELETE FROM contacts WHERE list_id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        let list = sqlx::query("DELETE FROM contact_lists WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        if list.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(AppError::not_found("List", id));
        }

        tx.commit().await?;

        tracing::debug!(
            list_id = %id,
            contacts_removed = contacts.rows_affected(),
            "List delete committed"
        );

        Ok(contacts.rows_affected())
    }

    async fn import(
        &self,
        owner_id: Uuid,
        target: ImportTarget,
        contacts: Vec<NewContact>,
    ) -> Result<ImportSummary> {
        let mut tx = self.pool.begin().await?;

        let list_id = match target {
            ImportTarget::Existing(id) => {
                if !list_owned_by(&mut *tx, owner_id, id).await? {
                    return Err(AppError::not_found("List", id));
                }
                id
            }
            ImportTarget::NewList(list) => {
                let id = Uuid::new_v4();
                sqlx::query(
                    "INSERT INTO contact_lists (id, owner_id, name, segment) VALUES ($1, $2, $3, $4)",
                )
                .bind(id)
                .bind(owner_id)
                .bind(&list.name)
                .bind(&list.segment)
                .execute(&mut *tx)
                .await?;
                id
            }
        };

        let imported = contacts.len();
        for mut contact in contacts {
            contact.list_id = Some(list_id);
            insert_contact(&mut *tx, owner_id, &contact).await?;
        }

        tx.commit().await?;

        tracing::debug!(list_id = %list_id, imported, "Import transaction committed");

        Ok(ImportSummary {
            list: self.get(owner_id, list_id).await?,
            imported,
        })
    }
}
