use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SocialHandles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub list_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub social: SocialHandles,
    pub segments: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewContact {
    pub list_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub social: SocialHandles,
    pub segments: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ContactPatch {
    pub list_id: Option<Option<Uuid>>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<Option<String>>,
    pub social: Option<SocialHandles>,
    pub segments: Option<Vec<String>>,
}

impl ContactPatch {
    pub fn apply(self, contact: &mut Contact) {
        if let Some(list_id) = self.list_id {
            contact.list_id = list_id;
        }
        if let Some(name) = self.name {
            contact.name = name;
        }
        if let Some(email) = self.email {
            contact.email = email;
        }
        if let Some(phone) = self.phone {
            contact.phone = phone;
        }
        if let Some(social) = self.social {
            contact.social = social;
        }
        if let Some(segments) = self.segments {
            contact.segments = segments;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContactFilter {
    pub list_id: Option<Uuid>,
    pub segment: Option<String>,
    pub search: Option<String>,
}

impl ContactFilter {
    pub fn matches(&self, contact: &Contact) -> bool {
        if let Some(list_id) = self.list_id {
            if contact.list_id != Some(list_id) {
                return false;
            }
        }
        if let Some(ref segment) = self.segment {
            if !contact.segments.iter().any(|s| s.eq_ignore_ascii_case(segment)) {
                return false;
            }
        }
        if let Some(ref search) = self.search {
            let needle = search.to_lowercase();
            if !contact.name.to_lowercase().contains(&needle)
                && !contact.email.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

/// Trims, drops empties and de-duplicates segment tags, keeping first-seen order.
pub fn normalize_segments<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if tag.is_empty() || out.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            continue;
        }
        out.push(tag.to_string());
    }
    out
}
