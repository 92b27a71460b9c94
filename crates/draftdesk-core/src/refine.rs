use crate::error::{DeskError, Result};
use crate::types::Settings;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefineMode {
    Prompt,
    Supplement,
}

impl RefineMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RefineMode::Prompt => "prompt",
            RefineMode::Supplement => "supplement",
        }
    }

    /// The configured system prompt for this mode.
    pub fn system_prompt(self, settings: &Settings) -> &str {
        match self {
            RefineMode::Prompt => &settings.prompt_system,
            RefineMode::Supplement => &settings.supplement_system,
        }
    }
}

impl fmt::Display for RefineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RefineMode {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "prompt" => Ok(RefineMode::Prompt),
            "supplement" => Ok(RefineMode::Supplement),
            _ => Err(DeskError::InvalidRefineMode(s.to_string())),
        }
    }
}

/// Body of `POST /assistant/refine`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefineRequest {
    pub mode: RefineMode,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl RefineRequest {
    pub fn new(
        mode: RefineMode,
        text: impl Into<String>,
        instruction: Option<&str>,
        settings: &Settings,
    ) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DeskError::user_input("Nothing to refine: the text is empty."));
        }
        let instruction = instruction
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let system = mode.system_prompt(settings).trim();
        Ok(Self {
            mode,
            text,
            instruction,
            system_prompt: (!system.is_empty()).then(|| system.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            prompt_system: "You edit prompts.".to_string(),
            supplement_system: "  ".to_string(),
        }
    }

    #[test]
    fn picks_system_prompt_by_mode() {
        let req = RefineRequest::new(RefineMode::Prompt, "draft", Some("tighter"), &settings())
            .unwrap();
        assert_eq!(req.system_prompt.as_deref(), Some("You edit prompts."));
        assert_eq!(req.instruction.as_deref(), Some("tighter"));
    }

    #[test]
    fn blank_system_prompt_is_omitted() {
        let req = RefineRequest::new(RefineMode::Supplement, "facts", None, &settings()).unwrap();
        assert!(req.system_prompt.is_none());
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({ "mode": "supplement", "text": "facts" }));
    }

    #[test]
    fn empty_text_is_rejected() {
        let err = RefineRequest::new(RefineMode::Prompt, " \n", None, &settings()).unwrap_err();
        assert!(matches!(err, DeskError::UserInput(_)));
    }

    #[test]
    fn mode_parse() {
        assert_eq!("prompt".parse::<RefineMode>().unwrap(), RefineMode::Prompt);
        assert!("article".parse::<RefineMode>().is_err());
    }
}
