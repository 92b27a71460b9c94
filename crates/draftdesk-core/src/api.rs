//! Blocking HTTP client for the content backend.
//!
//! Every endpoint maps failures into the same taxonomy:
//! transport failures and 5xx become [`DeskError::Network`], 404 becomes
//! [`DeskError::NotFound`], any other 4xx becomes [`DeskError::Validation`],
//! and an unparseable body becomes [`DeskError::Decode`].

use crate::catalog::Catalog;
use crate::config::BackendConfig;
use crate::error::{DeskError, Result};
use crate::refine::RefineRequest;
use crate::types::{
    ChatMessage, Item, ItemDraft, ItemKind, ItemPatch, Project, ProjectPatch, PromptType,
    Settings, SettingsPatch,
};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Request / response payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRequest {
    pub topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    pub prompt_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplemental: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CritiqueRequest {
    pub markdown: String,
    pub prompt_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplemental: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanRequest {
    pub topic: String,
    pub prompt_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplemental: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanContinueRequest {
    pub topic: String,
    pub prompt_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplemental: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub user_message: String,
}

#[derive(Debug, Deserialize)]
struct ArticleResponse {
    article: String,
}

#[derive(Debug, Deserialize)]
struct CritiqueResponse {
    critique: String,
}

#[derive(Debug, Deserialize)]
struct OutlineResponse {
    outline: String,
}

#[derive(Debug, Deserialize)]
struct RefineResponse {
    refined: String,
}

#[derive(Serialize)]
struct NewItem<'a> {
    title: &'a str,
    content: &'a str,
    tags: &'a [String],
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    prompt_type: Option<PromptType>,
}

// ---------------------------------------------------------------------------
// ContentBackend
// ---------------------------------------------------------------------------

/// The AI endpoints the consumer forms submit to.
pub trait ContentBackend {
    fn generate(&self, req: &GenerateRequest) -> Result<String>;
    fn critique(&self, req: &CritiqueRequest) -> Result<String>;
    fn plan_initial(&self, req: &PlanRequest) -> Result<String>;
    fn plan_continue(&self, req: &PlanContinueRequest) -> Result<String>;
}

// ---------------------------------------------------------------------------
// HttpBackend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| DeskError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -----------------------------------------------------------------------
    // Prompts
    // -----------------------------------------------------------------------

    pub fn list_prompts(&self) -> Result<Vec<Item>> {
        self.call(Method::GET, "/prompts/", None::<&()>)
    }

    pub fn get_prompt(&self, id: &str) -> Result<Item> {
        self.call(Method::GET, &format!("/prompts/{id}"), None::<&()>)
    }

    pub fn create_prompt(&self, prompt_type: PromptType, draft: &ItemDraft) -> Result<Item> {
        self.create_item(ItemKind::Prompt(prompt_type), draft)
    }

    pub fn update_prompt(&self, id: &str, patch: &ItemPatch) -> Result<Item> {
        self.call(Method::PUT, &format!("/prompts/{id}"), Some(patch))
    }

    pub fn delete_prompt(&self, id: &str) -> Result<()> {
        self.delete(&format!("/prompts/{id}"))
    }

    // -----------------------------------------------------------------------
    // Supplemental info
    // -----------------------------------------------------------------------

    pub fn list_supplementals(&self) -> Result<Vec<Item>> {
        self.call(Method::GET, "/supplementals/", None::<&()>)
    }

    pub fn create_supplemental(&self, draft: &ItemDraft) -> Result<Item> {
        self.create_item(ItemKind::Supplemental, draft)
    }

    /// Supplementals are replaced wholesale; the backend has no partial update.
    pub fn update_supplemental(&self, id: &str, draft: &ItemDraft) -> Result<Item> {
        self.call(Method::PUT, &format!("/supplementals/{id}"), Some(draft))
    }

    pub fn delete_supplemental(&self, id: &str) -> Result<()> {
        self.delete(&format!("/supplementals/{id}"))
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    pub fn list_projects(&self) -> Result<Vec<Project>> {
        self.call(Method::GET, "/projects/", None::<&()>)
    }

    pub fn get_project(&self, id: &str) -> Result<Project> {
        self.call(Method::GET, &format!("/projects/{id}"), None::<&()>)
    }

    pub fn create_project(&self, fields: &ProjectPatch) -> Result<Project> {
        if fields.title.as_deref().map_or(true, |t| t.trim().is_empty()) {
            return Err(DeskError::user_input("A project title is required."));
        }
        self.call(Method::POST, "/projects/", Some(fields))
    }

    pub fn update_project(&self, id: &str, patch: &ProjectPatch) -> Result<Project> {
        self.call(Method::PUT, &format!("/projects/{id}"), Some(patch))
    }

    pub fn delete_project(&self, id: &str) -> Result<()> {
        self.delete(&format!("/projects/{id}"))
    }

    // -----------------------------------------------------------------------
    // Settings / assistant
    // -----------------------------------------------------------------------

    pub fn get_settings(&self) -> Result<Settings> {
        self.call(Method::GET, "/settings/", None::<&()>)
    }

    pub fn update_settings(&self, patch: &SettingsPatch) -> Result<Settings> {
        self.call(Method::PUT, "/settings/", Some(patch))
    }

    pub fn refine(&self, req: &RefineRequest) -> Result<String> {
        let resp: RefineResponse = self.call(Method::POST, "/assistant/refine", Some(req))?;
        Ok(resp.refined)
    }

    // -----------------------------------------------------------------------
    // Plumbing
    // -----------------------------------------------------------------------

    fn create_item(&self, kind: ItemKind, draft: &ItemDraft) -> Result<Item> {
        let body = NewItem {
            title: &draft.title,
            content: &draft.content,
            tags: &draft.tags,
            prompt_type: kind.prompt_type(),
        };
        self.call(Method::POST, kind.collection_path(), Some(&body))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %url, "backend request");
        self.client.request(method, url)
    }

    fn call<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut req = self.request(method, path);
        if let Some(body) = body {
            req = req.json(body);
        }
        let text = send(req, path)?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::warn!(%path, error = %e, "undecodable backend response");
            DeskError::Decode(format!("{path}: {e}"))
        })
    }

    fn delete(&self, path: &str) -> Result<()> {
        send(self.request(Method::DELETE, path), path).map(|_| ())
    }
}

/// Send and return the body text of a successful response.
fn send(req: RequestBuilder, path: &str) -> Result<String> {
    let resp = req
        .send()
        .map_err(|e| DeskError::Network(format!("{path}: {e}")))?;
    let status = resp.status();
    let text = resp
        .text()
        .map_err(|e| DeskError::Network(format!("{path}: {e}")))?;

    if status.is_success() {
        return Ok(text);
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(DeskError::NotFound(error_detail(&text).unwrap_or_else(|| path.to_string())));
    }
    if status.is_client_error() {
        return Err(DeskError::Validation {
            status: status.as_u16(),
            message: error_detail(&text).unwrap_or_else(|| status.to_string()),
        });
    }
    Err(DeskError::Network(format!("{path}: server returned {status}")))
}

/// Pull a human-readable message out of an error body such as
/// `{"detail": "Prompt not found"}`.
fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Trait impls
// ---------------------------------------------------------------------------

impl ContentBackend for HttpBackend {
    fn generate(&self, req: &GenerateRequest) -> Result<String> {
        let resp: ArticleResponse = self.call(Method::POST, "/generate", Some(req))?;
        Ok(resp.article)
    }

    fn critique(&self, req: &CritiqueRequest) -> Result<String> {
        let resp: CritiqueResponse = self.call(Method::POST, "/critique", Some(req))?;
        Ok(resp.critique)
    }

    fn plan_initial(&self, req: &PlanRequest) -> Result<String> {
        let resp: OutlineResponse = self.call(Method::POST, "/planner/initial", Some(req))?;
        Ok(resp.outline)
    }

    fn plan_continue(&self, req: &PlanContinueRequest) -> Result<String> {
        let resp: OutlineResponse = self.call(Method::POST, "/planner/continue", Some(req))?;
        Ok(resp.outline)
    }
}

impl Catalog for HttpBackend {
    fn fetch_all(&self, kind: ItemKind) -> Result<Vec<Item>> {
        let items: Vec<Item> = self.call(Method::GET, kind.collection_path(), None::<&()>)?;
        Ok(items.into_iter().filter(|i| i.matches(kind)).collect())
    }

    fn create(&self, kind: ItemKind, draft: &ItemDraft) -> Result<Item> {
        self.create_item(kind, draft)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
