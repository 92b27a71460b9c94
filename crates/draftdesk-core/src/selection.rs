//! Session-scoped selection persistence.
//!
//! A [`SessionStore`] is a flat string key/value area that lives as long as
//! one session. [`SelectionStore`] layers the selection contexts on top: each
//! context maps to an ordered list of item ids stored as a JSON array.

use crate::error::{DeskError, Result};
use crate::types::{ItemKind, PromptType};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
    /// Every key currently held, in sorted order.
    fn keys(&self) -> Result<Vec<String>>;
}

/// In-process session area. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        // A poisoned map is still a valid map; keep using it.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.lock().keys().cloned().collect())
    }
}

/// Session area persisted as one JSON object per session file. Every write
/// rewrites the file atomically, so concurrent sessions never see a torn file;
/// two writers on the same session race and the last one wins.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Open the store for `session_id` inside `sessions_dir`.
    pub fn for_session(sessions_dir: &Path, session_id: &str) -> Result<Self> {
        crate::paths::validate_session_id(session_id)?;
        Ok(Self::new(crate::paths::session_file(sessions_dir, session_id)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// End the session. Returns true if there was anything to clear.
    pub fn clear(&self) -> Result<bool> {
        crate::io::remove_if_exists(&self.path)
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        let Some(data) = crate::io::read_optional(&self.path)? else {
            return Ok(BTreeMap::new());
        };
        match serde_json::from_str(&data) {
            Ok(map) => Ok(map),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "session file is malformed, starting from an empty session"
                );
                Ok(BTreeMap::new())
            }
        }
    }

    fn store(&self, map: &BTreeMap<String, String>) -> Result<()> {
        let data = serde_json::to_string_pretty(map)?;
        crate::io::atomic_write(&self.path, data.as_bytes())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.load()?;
        map.insert(key.to_string(), value.to_string());
        self.store(&map)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut map = self.load()?;
        if map.remove(key).is_some() {
            self.store(&map)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.load()?.into_keys().collect())
    }
}

// ---------------------------------------------------------------------------
// SelectionContext
// ---------------------------------------------------------------------------

/// Why a selection is being made. Prompt selections are per form; the
/// supplemental selection is shared by every form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionContext {
    Prompts(PromptType),
    Supplementals,
}

impl SelectionContext {
    pub fn all() -> &'static [SelectionContext] {
        &[
            SelectionContext::Prompts(PromptType::Generation),
            SelectionContext::Prompts(PromptType::Critique),
            SelectionContext::Prompts(PromptType::Planner),
            SelectionContext::Supplementals,
        ]
    }

    /// Key in the session area.
    pub fn storage_key(self) -> &'static str {
        match self {
            SelectionContext::Prompts(PromptType::Generation) => "selectedPrompts_generation",
            SelectionContext::Prompts(PromptType::Critique) => "selectedPrompts_critique",
            SelectionContext::Prompts(PromptType::Planner) => "selectedPrompts_planner",
            SelectionContext::Supplementals => "selectedSupplements",
        }
    }

    pub fn item_kind(self) -> ItemKind {
        match self {
            SelectionContext::Prompts(t) => ItemKind::Prompt(t),
            SelectionContext::Supplementals => ItemKind::Supplemental,
        }
    }
}

impl fmt::Display for SelectionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionContext::Prompts(t) => write!(f, "prompts:{t}"),
            SelectionContext::Supplementals => f.write_str("supplementals"),
        }
    }
}

impl std::str::FromStr for SelectionContext {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self> {
        if s == "supplementals" {
            return Ok(SelectionContext::Supplementals);
        }
        let Some(t) = s.strip_prefix("prompts:") else {
            return Err(DeskError::InvalidContext(s.to_string()));
        };
        t.parse::<PromptType>()
            .map(SelectionContext::Prompts)
            .map_err(|_| DeskError::InvalidContext(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// SelectionStore
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct SelectionStore {
    session: Arc<dyn SessionStore>,
}

impl SelectionStore {
    pub fn new(session: Arc<dyn SessionStore>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Ids stored for `context`. Absent, unreadable, or malformed entries all
    /// read as an empty selection.
    pub fn read(&self, context: SelectionContext) -> Vec<String> {
        let raw = match self.session.get(context.storage_key()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(%context, error = %e, "could not read selection");
                return Vec::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(%context, error = %e, "discarding malformed selection");
            Vec::new()
        })
    }

    /// Overwrite the selection for `context`. A storage failure is logged and
    /// affects only this write.
    pub fn write(&self, context: SelectionContext, ids: &[String]) {
        let result = serde_json::to_string(ids)
            .map_err(DeskError::from)
            .and_then(|raw| self.session.set(context.storage_key(), &raw));
        match result {
            Ok(()) => tracing::debug!(%context, count = ids.len(), "selection written"),
            Err(e) => tracing::warn!(%context, error = %e, "could not write selection"),
        }
    }
}

impl fmt::Debug for SelectionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionStore").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
