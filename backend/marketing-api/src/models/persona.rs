// AI agent and creator personas share one shape; `kind` tells them apart.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PersonaKind {
    Agent,
    Creator,
}

impl PersonaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonaKind::Agent => "agent",
            PersonaKind::Creator => "creator",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PersonaKind::Agent => "AI agent",
            PersonaKind::Creator => "AI creator",
        }
    }
}

impl FromStr for PersonaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "agent" => Ok(PersonaKind::Agent),
            "creator" => Ok(PersonaKind::Creator),
            other => Err(format!("unknown persona kind '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Professional,
    Friendly,
    Casual,
    Persuasive,
    Empathetic,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Friendly => "friendly",
            Tone::Casual => "casual",
            Tone::Persuasive => "persuasive",
            Tone::Empathetic => "empathetic",
        }
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "professional" => Ok(Tone::Professional),
            "friendly" => Ok(Tone::Friendly),
            "casual" => Ok(Tone::Casual),
            "persuasive" => Ok(Tone::Persuasive),
            "empathetic" => Ok(Tone::Empathetic),
            other => Err(format!("unknown tone '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    Informative,
    Storytelling,
    Humorous,
    Inspirational,
    Promotional,
}

impl Style {
    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Informative => "informative",
            Style::Storytelling => "storytelling",
            Style::Humorous => "humorous",
            Style::Inspirational => "inspirational",
            Style::Promotional => "promotional",
        }
    }
}

impl FromStr for Style {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "informative" => Ok(Style::Informative),
            "storytelling" => Ok(Style::Storytelling),
            "humorous" => Ok(Style::Humorous),
            "inspirational" => Ok(Style::Inspirational),
            "promotional" => Ok(Style::Promotional),
            other => Err(format!("unknown style '{}'", other)),
        }
    }
}

impl fmt::Display for PersonaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct KeywordTrigger {
    #[validate(length(min = 1, max = 100))]
    pub keyword: String,
    #[validate(length(min = 1, max = 2000))]
    pub response: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub kind: PersonaKind,
    pub name: String,
    pub behavior: String,
    pub goal: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<Tone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub niche: Option<String>,
    pub triggers: Vec<KeywordTrigger>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPersona {
    pub kind: PersonaKind,
    pub name: String,
    pub behavior: String,
    pub goal: String,
    pub tone: Option<Tone>,
    pub style: Option<Style>,
    pub niche: Option<String>,
    pub triggers: Vec<KeywordTrigger>,
    pub active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PersonaPatch {
    pub name: Option<String>,
    pub behavior: Option<String>,
    pub goal: Option<String>,
    pub tone: Option<Tone>,
    pub style: Option<Style>,
    pub niche: Option<String>,
    pub triggers: Option<Vec<KeywordTrigger>>,
    pub active: Option<bool>,
}

impl PersonaPatch {
    pub fn apply(self, persona: &mut Persona) {
        if let Some(name) = self.name {
            persona.name = name;
        }
        if let Some(behavior) = self.behavior {
            persona.behavior = behavior;
        }
        if let Some(goal) = self.goal {
            persona.goal = goal;
        }
        if let Some(tone) = self.tone {
            persona.tone = Some(tone);
        }
        if let Some(style) = self.style {
            persona.style = Some(style);
        }
        if let Some(niche) = self.niche {
            persona.niche = Some(niche);
        }
        if let Some(triggers) = self.triggers {
            persona.triggers = triggers;
        }
        if let Some(active) = self.active {
            persona.active = active;
        }
    }
}
