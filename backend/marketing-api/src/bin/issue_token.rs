//! Mints a bearer token for local development.
//! Run with: cargo run --bin issue-token
//!
//! OWNER_ID (UUID) and OWNER_EMAIL pick the identity; a fresh owner id is
//! generated when OWNER_ID is unset. The signing secret and lifetime come from
//! the same configuration the server reads.

use uuid::Uuid;

use marketing_api::config::Config;
use marketing_api::middleware::issue_token;

fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    let owner_id = match std::env::var("OWNER_ID") {
        Ok(raw) => Uuid::parse_str(raw.trim())
            .map_err(|e| anyhow::anyhow!("OWNER_ID is not a UUID: {}", e))?,
        Err(_) => Uuid::new_v4(),
    };
    let email = std::env::var("OWNER_EMAIL").unwrap_or_else(|_| "owner@reachflow.dev".to_string());

    let token = issue_token(&config.jwt.secret, owner_id, &email, config.jwt.expiry_hours)?;

    println!("Owner ID:   {}", owner_id);
    println!("Email:      {}", email);
    println!("Expires in: {}h", config.jwt.expiry_hours);
    println!();
    println!("{}", token);

    Ok(())
}
