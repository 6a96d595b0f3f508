//! sqlx-backed repositories over the tables created in `migrations/`.
//!
//! Enumerations are stored as lower-case TEXT and parsed back on read; JSON
//! structures (campaign blocks and stats, persona triggers) live in JSONB.

mod accounts;
mod campaigns;
mod contacts;
mod lists;
mod personas;
mod templates;

pub use accounts::PgAccountRepository;
pub use campaigns::PgCampaignRepository;
pub use contacts::PgContactRepository;
pub use lists::PgListRepository;
pub use personas::PgPersonaRepository;
pub use templates::PgTemplateRepository;

use std::str::FromStr;

use crate::error::{AppError, Result};

/// Parses a TEXT column holding an enum value.
fn parse_column<T>(column: &str, value: &str) -> Result<T>
where
    T: FromStr<Err = String>,
{
    value
        .parse()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("corrupt {} column: {}", column, e)))
}

fn parse_optional_column<T>(column: &str, value: Option<&str>) -> Result<Option<T>>
where
    T: FromStr<Err = String>,
{
    value.map(|v| parse_column(column, v)).transpose()
}
