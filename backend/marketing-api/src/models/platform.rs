use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::campaign::BlockAction;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Facebook,
    Instagram,
    Linkedin,
    Email,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Facebook,
        Platform::Instagram,
        Platform::Linkedin,
        Platform::Email,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Facebook => "facebook",
            Platform::Instagram => "instagram",
            Platform::Linkedin => "linkedin",
            Platform::Email => "email",
        }
    }

    /// Block actions offered by the flow builder for this platform.
    pub fn palette(&self) -> &'static [BlockAction] {
        match self {
            Platform::Facebook => &[
                BlockAction::SendMessage,
                BlockAction::FollowUp,
                BlockAction::LikePost,
                BlockAction::Comment,
                BlockAction::Wait,
            ],
            Platform::Instagram => &[
                BlockAction::Follow,
                BlockAction::LikePost,
                BlockAction::Comment,
                BlockAction::SendMessage,
                BlockAction::FollowUp,
                BlockAction::Wait,
            ],
            Platform::Linkedin => &[
                BlockAction::ViewProfile,
                BlockAction::ConnectionRequest,
                BlockAction::SendMessage,
                BlockAction::Endorse,
                BlockAction::FollowUp,
                BlockAction::Wait,
            ],
            Platform::Email => &[
                BlockAction::SendEmail,
                BlockAction::FollowUp,
                BlockAction::Wait,
            ],
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "facebook" => Ok(Platform::Facebook),
            "instagram" => Ok(Platform::Instagram),
            "linkedin" => Ok(Platform::Linkedin),
            "email" => Ok(Platform::Email),
            other => Err(format!("unknown platform '{}'", other)),
        }
    }
}
