use crate::error::DeskError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// PromptType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptType {
    Generation,
    Critique,
    Planner,
}

impl PromptType {
    pub fn all() -> &'static [PromptType] {
        &[
            PromptType::Generation,
            PromptType::Critique,
            PromptType::Planner,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PromptType::Generation => "generation",
            PromptType::Critique => "critique",
            PromptType::Planner => "planner",
        }
    }
}

impl fmt::Display for PromptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PromptType {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generation" => Ok(PromptType::Generation),
            "critique" => Ok(PromptType::Critique),
            "planner" => Ok(PromptType::Planner),
            _ => Err(DeskError::InvalidPromptType(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ItemKind
// ---------------------------------------------------------------------------

/// Which catalog an item lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Prompt(PromptType),
    Supplemental,
}

impl ItemKind {
    pub fn all() -> [ItemKind; 4] {
        [
            ItemKind::Prompt(PromptType::Generation),
            ItemKind::Prompt(PromptType::Critique),
            ItemKind::Prompt(PromptType::Planner),
            ItemKind::Supplemental,
        ]
    }

    /// Collection endpoint on the backend, trailing slash included.
    pub fn collection_path(self) -> &'static str {
        match self {
            ItemKind::Prompt(_) => "/prompts/",
            ItemKind::Supplemental => "/supplementals/",
        }
    }

    pub fn prompt_type(self) -> Option<PromptType> {
        match self {
            ItemKind::Prompt(t) => Some(t),
            ItemKind::Supplemental => None,
        }
    }

    /// Notice shown when the catalog has nothing of this kind.
    pub fn empty_notice(self) -> String {
        match self {
            ItemKind::Prompt(t) => format!("No {t} prompts yet."),
            ItemKind::Supplemental => "No supplemental info yet.".to_string(),
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Prompt(t) => write!(f, "{t} prompt"),
            ItemKind::Supplemental => f.write_str("supplemental info"),
        }
    }
}

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// A prompt or a supplemental info snippet. Identifiers are always assigned
/// by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub prompt_type: Option<PromptType>,
}

impl Item {
    pub fn kind(&self) -> ItemKind {
        match self.prompt_type {
            Some(t) => ItemKind::Prompt(t),
            None => ItemKind::Supplemental,
        }
    }

    pub fn matches(&self, kind: ItemKind) -> bool {
        match kind {
            ItemKind::Prompt(t) => self.prompt_type == Some(t),
            ItemKind::Supplemental => true,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Fields for creating or replacing an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ItemDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = dedup_tags(tags);
        self
    }
}

/// Partial prompt update; unset fields are left alone by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub prompt_type: Option<PromptType>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.tags.is_none()
            && self.prompt_type.is_none()
    }
}

/// Split a comma-separated tag input, trimming whitespace and dropping blanks.
pub fn parse_tags(input: &str) -> Vec<String> {
    dedup_tags(
        input
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

// Keeps first occurrence so display order matches entry order.
fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planning: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planning: Option<String>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.custom_instructions.is_none()
            && self.planning.is_none()
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// System prompts used by the refine assistant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub prompt_system: String,
    #[serde(default)]
    pub supplement_system: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplement_system: Option<String>,
}

// ---------------------------------------------------------------------------
// ChatMessage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
