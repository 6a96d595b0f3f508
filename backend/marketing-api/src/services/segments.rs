use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::models::{Contact, ContactList, Segment};

/// Counts contacts per segment. A contact belongs to its own tags and to the
/// segment label of its list; each contact counts once per segment.
/// Segment names compare case-insensitively and keep their first spelling.
pub fn aggregate_segments(contacts: &[Contact], lists: &[ContactList]) -> Vec<Segment> {
    let list_labels: HashMap<Uuid, &str> = lists
        .iter()
        .filter_map(|l| l.segment.as_deref().map(|s| (l.id, s.trim())))
        .filter(|(_, s)| !s.is_empty())
        .collect();

    // lower-cased name -> (display name, count)
    let mut counts: BTreeMap<String, (String, i64)> = BTreeMap::new();

    for label in list_labels.values() {
        counts
            .entry(label.to_lowercase())
            .or_insert_with(|| (label.to_string(), 0));
    }

    for contact in contacts {
        let mut names: Vec<&str> = contact.segments.iter().map(|s| s.trim()).collect();
        if let Some(label) = contact.list_id.and_then(|id| list_labels.get(&id)) {
            names.push(label);
        }

        let mut seen: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            let key = name.to_lowercase();
            if name.is_empty() || seen.contains(&key) {
                continue;
            }
            counts
                .entry(key.clone())
                .or_insert_with(|| (name.to_string(), 0))
                .1 += 1;
            seen.push(key);
        }
    }

    let mut segments: Vec<Segment> = counts
        .into_values()
        .map(|(name, contact_count)| Segment { name, contact_count })
        .collect();
    segments.sort_by(|a, b| b.contact_count.cmp(&a.contact_count).then_with(|| a.name.cmp(&b.name)));
    segments
}
