use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Platform;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub platform: Platform,
    pub name: String,
    pub subject: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTemplate {
    pub platform: Platform,
    pub name: String,
    pub subject: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, Default)]
pub struct TemplatePatch {
    pub platform: Option<Platform>,
    pub name: Option<String>,
    pub subject: Option<Option<String>>,
    pub body: Option<String>,
}

impl TemplatePatch {
    pub fn apply(self, template: &mut Template) {
        if let Some(platform) = self.platform {
            template.platform = platform;
        }
        if let Some(name) = self.name {
            template.name = name;
        }
        if let Some(subject) = self.subject {
            template.subject = subject;
        }
        if let Some(body) = self.body {
            template.body = body;
        }
    }
}
