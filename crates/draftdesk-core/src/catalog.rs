//! Item catalogs: the full server-side collections of prompts and
//! supplemental info.

use crate::error::{DeskError, Result};
use crate::types::{Item, ItemDraft, ItemKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub trait Catalog: Send + Sync {
    /// Every item of `kind`, in catalog order.
    fn fetch_all(&self, kind: ItemKind) -> Result<Vec<Item>>;
    /// Create an item. The returned item carries its server-assigned id.
    fn create(&self, kind: ItemKind, draft: &ItemDraft) -> Result<Item>;
}

impl<C: Catalog + ?Sized> Catalog for Arc<C> {
    fn fetch_all(&self, kind: ItemKind) -> Result<Vec<Item>> {
        (**self).fetch_all(kind)
    }

    fn create(&self, kind: ItemKind, draft: &ItemDraft) -> Result<Item> {
        (**self).create(kind, draft)
    }
}

/// Fetch a catalog for display. Failures are logged and shown as an empty list.
pub fn fetch_or_empty(catalog: &dyn Catalog, kind: ItemKind) -> (Vec<Item>, Option<DeskError>) {
    match catalog.fetch_all(kind) {
        Ok(items) => (items, None),
        Err(e) => {
            tracing::warn!(%kind, error = %e, "catalog fetch failed, showing empty list");
            (Vec::new(), Some(e))
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryCatalog
// ---------------------------------------------------------------------------

/// Catalog held in memory. Stands in for the backend offline and in tests;
/// it assigns ids the way the backend does and counts fetches.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    items: Mutex<Vec<Item>>,
    fetches: Mutex<usize>,
    fail_fetches: Mutex<bool>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<Item>) -> Self {
        Self {
            items: Mutex::new(items),
            ..Default::default()
        }
    }

    /// Number of `fetch_all` calls served so far.
    pub fn fetch_count(&self) -> usize {
        *self.fetches.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make subsequent fetches fail with a network error.
    pub fn set_offline(&self, offline: bool) {
        *self.fail_fetches.lock().unwrap_or_else(|e| e.into_inner()) = offline;
    }

    pub fn snapshot(&self) -> Vec<Item> {
        self.items.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Catalog for MemoryCatalog {
    fn fetch_all(&self, kind: ItemKind) -> Result<Vec<Item>> {
        *self.fetches.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        if *self.fail_fetches.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(DeskError::Network("catalog offline".to_string()));
        }
        let items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        Ok(items
            .iter()
            .filter(|i| i.kind() == kind)
            .cloned()
            .collect())
    }

    fn create(&self, kind: ItemKind, draft: &ItemDraft) -> Result<Item> {
        if draft.title.trim().is_empty() || draft.content.trim().is_empty() {
            return Err(DeskError::Validation {
                status: 422,
                message: "title and content are required".to_string(),
            });
        }
        let item = Item {
            id: uuid::Uuid::new_v4().to_string(),
            title: draft.title.clone(),
            content: draft.content.clone(),
            tags: draft.tags.clone(),
            prompt_type: kind.prompt_type(),
        };
        self.items
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(item.clone());
        Ok(item)
    }
}

// ---------------------------------------------------------------------------
// CachedCatalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Every fetch goes to the inner catalog.
    #[default]
    AlwaysFetch,
    /// Reuse a fetched list for this long.
    ReuseFor(Duration),
}

/// A fetched list and when it was fetched, in milliseconds since the epoch.
/// This is also the on-disk shape, so a later process can reuse it.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    fetched_at_ms: u64,
    items: Vec<Item>,
}

impl CacheEntry {
    fn new(items: Vec<Item>) -> Self {
        Self {
            fetched_at_ms: now_ms(),
            items,
        }
    }

    fn is_fresh(&self, ttl: Duration) -> bool {
        // An entry stamped in the future (clock moved back) counts as stale.
        match now_ms().checked_sub(self.fetched_at_ms) {
            Some(age) => u128::from(age) < ttl.as_millis(),
            None => false,
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn cache_file_name(kind: ItemKind) -> String {
    match kind {
        ItemKind::Prompt(t) => format!("prompts-{}.json", t.as_str()),
        ItemKind::Supplemental => "supplementals.json".to_string(),
    }
}

/// Wraps a catalog with an explicit cache-or-fetch policy.
///
/// Fetched lists are kept in memory and, when a cache directory is set,
/// mirrored to `<dir>/<kind>.json` so separate runs share them. Disk
/// problems are logged and never fail a fetch.
pub struct CachedCatalog<C> {
    inner: C,
    policy: CachePolicy,
    dir: Option<PathBuf>,
    cache: Mutex<HashMap<ItemKind, CacheEntry>>,
}

impl<C: Catalog> CachedCatalog<C> {
    pub fn new(inner: C, policy: CachePolicy) -> Self {
        Self {
            inner,
            policy,
            dir: None,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Persist fetched lists under `dir`.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Forget every cached list, in memory and on disk.
    pub fn invalidate(&self) {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).clear();
        let Some(dir) = &self.dir else { return };
        for kind in ItemKind::all() {
            let path = dir.join(cache_file_name(kind));
            if let Err(e) = crate::io::remove_if_exists(&path) {
                tracing::warn!(path = %path.display(), error = %e, "failed to drop catalog cache");
            }
        }
    }

    fn load_disk(&self, kind: ItemKind) -> Option<CacheEntry> {
        let path = self.dir.as_ref()?.join(cache_file_name(kind));
        let raw = match crate::io::read_optional(&path) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read catalog cache");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed catalog cache");
                None
            }
        }
    }

    fn store(&self, kind: ItemKind, entry: CacheEntry) {
        if let Some(dir) = &self.dir {
            let path = dir.join(cache_file_name(kind));
            let written = serde_json::to_vec(&entry)
                .map_err(DeskError::from)
                .and_then(|data| crate::io::atomic_write(&path, &data));
            if let Err(e) = written {
                tracing::warn!(path = %path.display(), error = %e, "failed to write catalog cache");
            }
        }
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(kind, entry);
    }
}

impl<C: Catalog> Catalog for CachedCatalog<C> {
    fn fetch_all(&self, kind: ItemKind) -> Result<Vec<Item>> {
        let CachePolicy::ReuseFor(ttl) = self.policy else {
            return self.inner.fetch_all(kind);
        };
        let cached = self
            .cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&kind)
            .cloned();
        if let Some(entry) = cached.or_else(|| self.load_disk(kind)) {
            if entry.is_fresh(ttl) {
                tracing::debug!(%kind, "catalog served from cache");
                return Ok(entry.items);
            }
        }
        let items = self.inner.fetch_all(kind)?;
        self.store(kind, CacheEntry::new(items.clone()));
        Ok(items)
    }

    fn create(&self, kind: ItemKind, draft: &ItemDraft) -> Result<Item> {
        let item = self.inner.create(kind, draft)?;
        if self.policy == CachePolicy::AlwaysFetch {
            return Ok(item);
        }
        let cached = self
            .cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&kind)
            .cloned();
        if let Some(mut entry) = cached.or_else(|| self.load_disk(kind)) {
            entry.items.push(item.clone());
            self.store(kind, entry);
        }
        Ok(item)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
