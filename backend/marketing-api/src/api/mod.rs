mod accounts;
mod campaigns;
mod contacts;
mod dashboard;
mod lists;
mod personas;
mod segments;
mod templates;

use axum::Router;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::PersonaKind;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/contacts", contacts::routes())
        .nest("/lists", lists::routes())
        .nest("/campaigns", campaigns::routes())
        .nest("/accounts", accounts::routes())
        .nest("/templates", templates::routes())
        .nest("/agents", personas::routes(PersonaKind::Agent))
        .nest("/creators", personas::routes(PersonaKind::Creator))
        .nest("/segments", segments::routes())
        .nest("/dashboard", dashboard::routes())
}

fn parse_id(raw: &str, kind: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("Invalid {} ID", kind)))
}

/// Parses an optional query parameter, treating an empty value as absent.
fn parse_param<T>(raw: Option<&str>, name: &str) -> Result<Option<T>>
where
    T: FromStr<Err = String>,
{
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|e| AppError::BadRequest(format!("{}: {}", name, e))),
        None => Ok(None),
    }
}

/// Distinguishes a field sent as `null` (`Some(None)`) from one left out
/// (`None`) in update payloads. Pair with `#[serde(default)]`.
fn double_option<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Trims a string while deserializing, so a whitespace-only value reaches
/// `validate()` as empty.
fn trimmed<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|s| s.trim().to_string())
}

/// `trimmed` for optional fields. Pair with `#[serde(default)]`.
fn trimmed_option<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|v| v.map(|s| s.trim().to_string()))
}

/// Trims a free-text field and drops it when nothing is left.
fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
