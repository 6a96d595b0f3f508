use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::parse_column;
use crate::error::{AppError, Result};
use crate::models::{Account, ConnectionOutcome, ConnectionStatus, NewAccount, Platform};
use crate::repository::AccountRepository;

const ACCOUNT_COLUMNS: &str =
    "id, owner_id, platform, email, status, failure_reason, connected_at, created_at, updated_at";

#[derive(Debug, FromRow)]
struct AccountRow {
    id: Uuid,
    owner_id: Uuid,
    platform: String,
    email: String,
    status: String,
    failure_reason: Option<String>,
    connected_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = AppError;

    fn try_from(row: AccountRow) -> Result<Self> {
        Ok(Account {
            id: row.id,
            owner_id: row.owner_id,
            platform: parse_column("platform_accounts.platform", &row.platform)?,
            email: row.email,
            status: parse_column("platform_accounts.status", &row.status)?,
            failure_reason: row.failure_reason,
            connected_at: row.connected_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn create(&self, owner_id: Uuid, account: NewAccount) -> Result<Account> {
        let query = format!(
            r#"
            INSERT INTO platform_accounts (id, owner_id, platform, email, status, failure_reason, connected_at)
            VALUES ($1, $2, $3, $4, $5, $6, CASE WHEN $5 = 'connected' THEN NOW() END)
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        );

        let row: AccountRow = sqlx::query_as(&query)
            .bind(Uuid::new_v4())
            .bind(owner_id)
            .bind(account.platform.as_str())
            .bind(&account.email)
            .bind(account.outcome.status.as_str())
            .bind(&account.outcome.failure_reason)
            .fetch_one(&self.pool)
            .await?;

        Account::try_from(row)
    }

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Account> {
        let query = format!(
            "SELECT {} FROM platform_accounts WHERE id = $1 AND owner_id = $2",
            ACCOUNT_COLUMNS
        );
        let row: AccountRow = sqlx::query_as(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("Account", id))?;

        Account::try_from(row)
    }

    async fn list(&self, owner_id: Uuid, platform: Option<Platform>) -> Result<Vec<Account>> {
        let query = format!(
            r#"
            SELECT {} FROM platform_accounts
            WHERE owner_id = $1 AND ($2::TEXT IS NULL OR platform = $2)
            ORDER BY created_at DESC
            "#,
            ACCOUNT_COLUMNS
        );
        let rows: Vec<AccountRow> = sqlx::query_as(&query)
            .bind(owner_id)
            .bind(platform.map(|p| p.as_str()))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Account::try_from).collect()
    }

    async fn record_outcome(
        &self,
        owner_id: Uuid,
        id: Uuid,
        outcome: ConnectionOutcome,
    ) -> Result<Account> {
        let query = format!(
            r#"
            UPDATE platform_accounts
            SET status = $3,
                failure_reason = $4,
                connected_at = CASE WHEN $3 = $5 THEN NOW() ELSE connected_at END,
                updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        );

        let row: AccountRow = sqlx::query_as(&query)
            .bind(id)
            .bind(owner_id)
            .bind(outcome.status.as_str())
            .bind(&outcome.failure_reason)
            .bind(ConnectionStatus::Connected.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("Account", id))?;

        Account::try_from(row)
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM platform_accounts WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Account", id));
        }
        Ok(())
    }
}
