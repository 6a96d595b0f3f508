use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactList {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub segment: Option<String>,
    pub contact_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewList {
    pub name: String,
    pub segment: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ListPatch {
    pub name: Option<String>,
    pub segment: Option<Option<String>>,
}

impl ListPatch {
    pub fn apply(self, list: &mut ContactList) {
        if let Some(name) = self.name {
            list.name = name;
        }
        if let Some(segment) = self.segment {
            list.segment = segment;
        }
    }
}

/// A contact tag and how many of the owner's contacts carry it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Segment {
    pub name: String,
    pub contact_count: i64,
}
