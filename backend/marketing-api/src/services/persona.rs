use crate::models::{KeywordTrigger, Persona};

/// First trigger whose keyword appears in `message`, ignoring case and
/// surrounding whitespace. Triggers are checked in their configured order.
pub fn match_trigger<'a>(triggers: &'a [KeywordTrigger], message: &str) -> Option<&'a KeywordTrigger> {
    let haystack = message.to_lowercase();
    triggers.iter().find(|t| {
        let keyword = t.keyword.trim().to_lowercase();
        !keyword.is_empty() && haystack.contains(&keyword)
    })
}

/// What a persona would answer to an incoming message.
pub fn preview_reply<'a>(persona: &'a Persona, message: &str) -> Option<&'a KeywordTrigger> {
    if !persona.active {
        return None;
    }
    match_trigger(&persona.triggers, message)
}
