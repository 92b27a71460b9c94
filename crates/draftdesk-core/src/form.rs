//! Consumer forms: Generate, Critique, and Planner.
//!
//! Each form shows its selected prompts and the shared supplemental
//! selection as chips. On mount the stored ids are resolved against a fresh
//! catalog fetch; ids with no matching item are dropped without complaint.
//! Any change to a chip list rewrites that context's stored ids in full.

use crate::api::{
    ContentBackend, CritiqueRequest, GenerateRequest, PlanContinueRequest, PlanRequest,
};
use crate::catalog::{fetch_or_empty, Catalog};
use crate::creation::CreationModal;
use crate::error::{DeskError, Result};
use crate::selection::{SelectionContext, SelectionStore};
use crate::selector::{ReturnTo, SelectorScreen};
use crate::types::{ChatMessage, Item, PromptType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const GENERATE_ROUTE: &str = "/generate";
pub const CRITIQUE_ROUTE: &str = "/critique";
pub const PLANNER_ROUTE: &str = "/planner";

/// Session key holding the planner's topic and transcript.
pub const PLANNER_TRANSCRIPT_KEY: &str = "plannerMessages";

const SUPPLEMENTAL_SEPARATOR: &str = "\n\n---\n\n";

// ---------------------------------------------------------------------------
// ChipList
// ---------------------------------------------------------------------------

/// Resolved selection for one context.
#[derive(Debug, Clone)]
pub struct ChipList {
    context: SelectionContext,
    items: Vec<Item>,
    load_error: Option<String>,
}

impl ChipList {
    /// Resolve the stored ids for `context` against the current catalog.
    pub fn reconcile(
        context: SelectionContext,
        store: &SelectionStore,
        catalog: &dyn Catalog,
    ) -> Self {
        let stored = store.read(context);
        let (catalog_items, err) = fetch_or_empty(catalog, context.item_kind());

        let mut items: Vec<Item> = Vec::with_capacity(stored.len());
        for id in &stored {
            if items.iter().any(|i| &i.id == id) {
                continue;
            }
            if let Some(found) = catalog_items.iter().find(|i| &i.id == id) {
                items.push(found.clone());
            }
        }

        let chips = Self {
            context,
            items,
            load_error: err.as_ref().map(DeskError::user_message),
        };
        // Without a catalog nothing resolves; keep the stored ids for a later
        // visit instead of wiping them.
        if err.is_none() && chips.items.len() != stored.len() {
            tracing::debug!(
                %context,
                dropped = stored.len() - chips.items.len(),
                "dropping unresolved selection ids"
            );
            chips.persist(store);
        }
        chips
    }

    pub fn context(&self) -> SelectionContext {
        self.context
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Why the catalog could not be fetched, if it could not. The chips are
    /// empty in that case even though the store may hold ids.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn ids(&self) -> Vec<String> {
        self.items.iter().map(|i| i.id.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first(&self) -> Option<&Item> {
        self.items.first()
    }

    /// Remove the chip for `id`. Returns false if there was no such chip.
    pub fn remove(&mut self, id: &str, store: &SelectionStore) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        let removed = self.items.len() != before;
        if removed {
            self.persist(store);
        }
        removed
    }

    /// Append `item` as a chip unless it is already present.
    pub fn add(&mut self, item: Item, store: &SelectionStore) {
        if self.items.iter().any(|i| i.id == item.id) {
            return;
        }
        self.items.push(item);
        self.persist(store);
    }

    /// Content of every chip joined for the request payload.
    pub fn joined_content(&self) -> Option<String> {
        if self.items.is_empty() {
            return None;
        }
        Some(
            self.items
                .iter()
                .map(|i| i.content.as_str())
                .collect::<Vec<_>>()
                .join(SUPPLEMENTAL_SEPARATOR),
        )
    }

    fn persist(&self, store: &SelectionStore) {
        store.write(self.context, &self.ids());
    }
}

// ---------------------------------------------------------------------------
// Selections
// ---------------------------------------------------------------------------

/// The prompt and supplemental chips every consumer form carries.
pub struct Selections {
    route: String,
    prompt_type: PromptType,
    store: SelectionStore,
    catalog: Arc<dyn Catalog>,
    prompts: ChipList,
    supplementals: ChipList,
}

impl Selections {
    pub fn mount(
        route: impl Into<String>,
        prompt_type: PromptType,
        store: SelectionStore,
        catalog: Arc<dyn Catalog>,
    ) -> Self {
        let prompts = ChipList::reconcile(
            SelectionContext::Prompts(prompt_type),
            &store,
            catalog.as_ref(),
        );
        let supplementals =
            ChipList::reconcile(SelectionContext::Supplementals, &store, catalog.as_ref());
        Self {
            route: route.into(),
            prompt_type,
            store,
            catalog,
            prompts,
            supplementals,
        }
    }

    /// Re-read the store, e.g. after returning from a selector.
    pub fn refresh(&mut self) {
        self.prompts =
            ChipList::reconcile(self.prompt_context(), &self.store, self.catalog.as_ref());
        self.supplementals = ChipList::reconcile(
            SelectionContext::Supplementals,
            &self.store,
            self.catalog.as_ref(),
        );
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn prompt_context(&self) -> SelectionContext {
        SelectionContext::Prompts(self.prompt_type)
    }

    pub fn prompts(&self) -> &ChipList {
        &self.prompts
    }

    pub fn supplementals(&self) -> &ChipList {
        &self.supplementals
    }

    /// Catalog failures hit while mounting, one per affected context.
    pub fn load_errors(&self) -> Vec<(SelectionContext, &str)> {
        [&self.prompts, &self.supplementals]
            .into_iter()
            .filter_map(|chips| chips.load_error().map(|e| (chips.context(), e)))
            .collect()
    }

    pub fn remove_prompt(&mut self, id: &str) -> bool {
        self.prompts.remove(id, &self.store)
    }

    pub fn remove_supplemental(&mut self, id: &str) -> bool {
        self.supplementals.remove(id, &self.store)
    }

    pub fn open_prompt_selector(&self) -> SelectorScreen {
        self.open_selector(self.prompt_context())
    }

    pub fn open_supplemental_selector(&self) -> SelectorScreen {
        self.open_selector(SelectionContext::Supplementals)
    }

    fn open_selector(&self, context: SelectionContext) -> SelectorScreen {
        SelectorScreen::enter(
            context,
            ReturnTo::new(self.route.clone()),
            self.store.clone(),
            Arc::clone(&self.catalog),
        )
    }

    /// Modal for adding a prompt without leaving the form.
    pub fn open_prompt_creation(&self) -> CreationModal {
        CreationModal::new(self.prompt_context().item_kind())
    }

    /// Submit `modal`; the created item becomes a selected chip of the
    /// matching list.
    pub fn create_item(&mut self, modal: &mut CreationModal) -> Result<()> {
        let catalog = Arc::clone(&self.catalog);
        let store = self.store.clone();
        let target = if modal.kind() == SelectionContext::Supplementals.item_kind() {
            &mut self.supplementals
        } else if modal.kind() == self.prompt_context().item_kind() {
            &mut self.prompts
        } else {
            return Err(DeskError::user_input(format!(
                "a {} cannot be selected on this form",
                modal.kind()
            )));
        };
        modal.submit(catalog.as_ref(), |item| target.add(item, &store))
    }

    /// The primary prompt for a request. Prompts are mandatory.
    fn require_prompt(&self) -> Result<String> {
        if let Some(first) = self.prompts.first() {
            return Ok(first.id.clone());
        }
        match self.prompts.load_error() {
            Some(e) => Err(DeskError::user_input(format!(
                "Could not load {} prompts: {e}",
                self.prompt_type
            ))),
            None => Err(DeskError::user_input("Select or add a prompt first.")),
        }
    }

    fn supplemental_payload(&self) -> Option<String> {
        self.supplementals.joined_content()
    }

    fn store(&self) -> &SelectionStore {
        &self.store
    }
}

fn require_text(value: &str, message: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DeskError::user_input(message));
    }
    Ok(trimmed.to_string())
}

// ---------------------------------------------------------------------------
// GenerateForm
// ---------------------------------------------------------------------------

pub struct GenerateForm {
    pub topic: String,
    pub instructions: String,
    pub selections: Selections,
    article: Option<String>,
}

impl GenerateForm {
    pub fn mount(store: SelectionStore, catalog: Arc<dyn Catalog>) -> Self {
        Self::mount_at(GENERATE_ROUTE, store, catalog)
    }

    /// Mount under a different route, e.g. inside a project dashboard.
    pub fn mount_at(route: impl Into<String>, store: SelectionStore, catalog: Arc<dyn Catalog>) -> Self {
        Self {
            topic: String::new(),
            instructions: String::new(),
            selections: Selections::mount(route, PromptType::Generation, store, catalog),
            article: None,
        }
    }

    pub fn build_request(&self) -> Result<GenerateRequest> {
        let prompt_id = self.selections.require_prompt()?;
        let topic = require_text(&self.topic, "Topic is required.")?;
        let instructions = self.instructions.trim();
        Ok(GenerateRequest {
            topic,
            instructions: (!instructions.is_empty()).then(|| instructions.to_string()),
            prompt_id,
            supplemental: self.selections.supplemental_payload(),
        })
    }

    pub fn submit(&mut self, backend: &dyn ContentBackend) -> Result<&str> {
        let req = self.build_request()?;
        let article = backend.generate(&req)?;
        Ok(self.article.insert(article).as_str())
    }

    pub fn article(&self) -> Option<&str> {
        self.article.as_deref()
    }
}

// ---------------------------------------------------------------------------
// CritiqueForm
// ---------------------------------------------------------------------------

pub struct CritiqueForm {
    pub markdown: String,
    pub selections: Selections,
    critique: Option<String>,
}

impl CritiqueForm {
    pub fn mount(store: SelectionStore, catalog: Arc<dyn Catalog>) -> Self {
        Self::mount_at(CRITIQUE_ROUTE, store, catalog)
    }

    pub fn mount_at(route: impl Into<String>, store: SelectionStore, catalog: Arc<dyn Catalog>) -> Self {
        Self {
            markdown: String::new(),
            selections: Selections::mount(route, PromptType::Critique, store, catalog),
            critique: None,
        }
    }

    pub fn build_request(&self) -> Result<CritiqueRequest> {
        let prompt_id = self.selections.require_prompt()?;
        if self.markdown.trim().is_empty() {
            return Err(DeskError::user_input("Paste or load some markdown to critique."));
        }
        Ok(CritiqueRequest {
            markdown: self.markdown.clone(),
            prompt_id,
            supplemental: self.selections.supplemental_payload(),
        })
    }

    pub fn submit(&mut self, backend: &dyn ContentBackend) -> Result<&str> {
        let req = self.build_request()?;
        let critique = backend.critique(&req)?;
        Ok(self.critique.insert(critique).as_str())
    }

    pub fn critique(&self) -> Option<&str> {
        self.critique.as_deref()
    }
}

// ---------------------------------------------------------------------------
// PlannerForm
// ---------------------------------------------------------------------------

/// Planner state kept in the session between calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerTranscript {
    pub topic: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

pub struct PlannerForm {
    pub topic: String,
    pub selections: Selections,
    messages: Vec<ChatMessage>,
}

impl PlannerForm {
    /// Mount and restore any transcript left in the session.
    pub fn mount(store: SelectionStore, catalog: Arc<dyn Catalog>) -> Self {
        Self::mount_at(PLANNER_ROUTE, store, catalog)
    }

    pub fn mount_at(route: impl Into<String>, store: SelectionStore, catalog: Arc<dyn Catalog>) -> Self {
        let transcript = load_transcript(&store);
        Self {
            topic: transcript.topic,
            selections: Selections::mount(route, PromptType::Planner, store, catalog),
            messages: transcript.messages,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Latest outline from the assistant.
    pub fn outline(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == crate::types::Role::Assistant)
            .map(|m| m.content.as_str())
    }

    pub fn build_initial(&self) -> Result<PlanRequest> {
        let prompt_id = self.selections.require_prompt()?;
        let topic = require_text(&self.topic, "Topic is required.")?;
        Ok(PlanRequest {
            topic,
            prompt_id,
            supplemental: self.selections.supplemental_payload(),
        })
    }

    /// Request a fresh outline, replacing the transcript.
    pub fn start(&mut self, backend: &dyn ContentBackend) -> Result<&str> {
        let req = self.build_initial()?;
        let outline = backend.plan_initial(&req)?;
        self.topic = req.topic;
        self.messages = vec![ChatMessage::assistant(outline)];
        self.save_transcript();
        Ok(&self.messages[0].content)
    }

    pub fn build_continue(&self, user_message: &str) -> Result<PlanContinueRequest> {
        let prompt_id = self.selections.require_prompt()?;
        let topic = require_text(&self.topic, "Topic is required.")?;
        let text = require_text(user_message, "Type a message to refine the outline.")?;
        if self.messages.is_empty() {
            return Err(DeskError::user_input("Start a plan before continuing it."));
        }
        let mut messages = self.messages.clone();
        messages.push(ChatMessage::user(text.clone()));
        Ok(PlanContinueRequest {
            topic,
            prompt_id,
            supplemental: self.selections.supplemental_payload(),
            messages,
            user_message: text,
        })
    }

    /// Send a follow-up. The user turn is recorded only once the assistant
    /// has answered, so a failed call leaves the transcript as it was.
    pub fn continue_plan(&mut self, user_message: &str, backend: &dyn ContentBackend) -> Result<&str> {
        let req = self.build_continue(user_message)?;
        let outline = backend.plan_continue(&req)?;
        self.messages = req.messages;
        self.messages.push(ChatMessage::assistant(outline));
        self.save_transcript();
        let last = self.messages.len() - 1;
        Ok(&self.messages[last].content)
    }

    pub fn reset(&mut self) {
        self.messages.clear();
        if let Err(e) = self.selections.store().session().remove(PLANNER_TRANSCRIPT_KEY) {
            tracing::warn!(error = %e, "could not clear planner transcript");
        }
    }

    fn save_transcript(&self) {
        let transcript = PlannerTranscript {
            topic: self.topic.clone(),
            messages: self.messages.clone(),
        };
        let result = serde_json::to_string(&transcript)
            .map_err(DeskError::from)
            .and_then(|raw| {
                self.selections
                    .store()
                    .session()
                    .set(PLANNER_TRANSCRIPT_KEY, &raw)
            });
        if let Err(e) = result {
            tracing::warn!(error = %e, "could not save planner transcript");
        }
    }
}

fn load_transcript(store: &SelectionStore) -> PlannerTranscript {
    match store.session().get(PLANNER_TRANSCRIPT_KEY) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "discarding malformed planner transcript");
            PlannerTranscript::default()
        }),
        Ok(None) => PlannerTranscript::default(),
        Err(e) => {
            tracing::warn!(error = %e, "could not read planner transcript");
            PlannerTranscript::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
