use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::Platform;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Connected,
    Failed,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "connected" => Ok(ConnectionStatus::Connected),
            "failed" => Ok(ConnectionStatus::Failed),
            other => Err(format!("unknown connection status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub platform: Platform,
    pub email: String,
    pub status: ConnectionStatus,
    pub failure_reason: Option<String>,
    pub connected_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of one simulated login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionOutcome {
    pub status: ConnectionStatus,
    pub failure_reason: Option<String>,
}

impl ConnectionOutcome {
    pub fn connected() -> Self {
        Self {
            status: ConnectionStatus::Connected,
            failure_reason: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: ConnectionStatus::Failed,
            failure_reason: Some(reason.into()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub platform: Platform,
    pub email: String,
    pub outcome: ConnectionOutcome,
}
