use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::Platform;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    #[default]
    Draft,
    Active,
    Paused,
    Running,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Active => "active",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Running => "running",
        }
    }

    /// Whether the campaign is meant to be delivering.
    pub fn is_live(&self) -> bool {
        matches!(self, CampaignStatus::Active | CampaignStatus::Running)
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(CampaignStatus::Draft),
            "active" => Ok(CampaignStatus::Active),
            "paused" => Ok(CampaignStatus::Paused),
            "running" => Ok(CampaignStatus::Running),
            other => Err(format!("unknown campaign status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BlockAction {
    SendMessage,
    SendEmail,
    FollowUp,
    Wait,
    ConnectionRequest,
    ViewProfile,
    LikePost,
    Comment,
    Follow,
    Endorse,
}

impl BlockAction {
    pub fn default_label(&self) -> &'static str {
        match self {
            BlockAction::SendMessage => "Send message",
            BlockAction::SendEmail => "Send email",
            BlockAction::FollowUp => "Follow up",
            BlockAction::Wait => "Wait",
            BlockAction::ConnectionRequest => "Send connection request",
            BlockAction::ViewProfile => "View profile",
            BlockAction::LikePost => "Like latest post",
            BlockAction::Comment => "Comment on post",
            BlockAction::Follow => "Follow",
            BlockAction::Endorse => "Endorse skills",
        }
    }
}

/// One step of a campaign flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Block {
    pub id: Uuid,
    pub action: BlockAction,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_hours: Option<u32>,
}

/// A block as submitted by a client, before the server assigns its id.
///
/// `id` is honoured when present so a client-side builder can save its own
/// ordering without losing block identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockDraft {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub action: BlockAction,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub delay_hours: Option<u32>,
}

impl BlockDraft {
    pub fn into_block(self) -> Block {
        let label = self
            .label
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| self.action.default_label().to_string());

        Block {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            action: self.action,
            label,
            delay_hours: self.delay_hours,
        }
    }
}

/// Delivery counters. Nothing sends yet, so these stay at zero.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CampaignStats {
    pub sent: u64,
    pub delivered: u64,
    pub opened: u64,
    pub clicked: u64,
    pub replied: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub platform: Platform,
    pub list_id: Option<Uuid>,
    pub template_id: Option<Uuid>,
    pub status: CampaignStatus,
    pub blocks: Vec<Block>,
    pub stats: CampaignStats,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCampaign {
    pub name: String,
    pub platform: Platform,
    pub list_id: Option<Uuid>,
    pub template_id: Option<Uuid>,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Default)]
pub struct CampaignPatch {
    pub name: Option<String>,
    pub list_id: Option<Option<Uuid>>,
    pub template_id: Option<Option<Uuid>>,
    pub status: Option<CampaignStatus>,
    pub blocks: Option<Vec<Block>>,
}

impl CampaignPatch {
    pub fn apply(self, campaign: &mut Campaign) {
        if let Some(name) = self.name {
            campaign.name = name;
        }
        if let Some(list_id) = self.list_id {
            campaign.list_id = list_id;
        }
        if let Some(template_id) = self.template_id {
            campaign.template_id = template_id;
        }
        if let Some(status) = self.status {
            campaign.status = status;
        }
        if let Some(blocks) = self.blocks {
            campaign.blocks = blocks;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CampaignFilter {
    pub platform: Option<Platform>,
    pub status: Option<CampaignStatus>,
    pub list_id: Option<Uuid>,
}

impl CampaignFilter {
    pub fn matches(&self, campaign: &Campaign) -> bool {
        self.platform.map_or(true, |p| campaign.platform == p)
            && self.status.map_or(true, |s| campaign.status == s)
            && self.list_id.map_or(true, |l| campaign.list_id == Some(l))
    }
}
