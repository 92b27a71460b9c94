//! Full-page picker for prompts or supplemental info.
//!
//! The screen works on a pending selection seeded from the selection store.
//! Nothing is written back until [`SelectorScreen::confirm`]; cancelling
//! discards every toggle and inline creation since entry (created items stay
//! in the backend catalog, they are just not selected).

use crate::catalog::{fetch_or_empty, Catalog};
use crate::creation::CreationModal;
use crate::error::Result;
use crate::selection::{SelectionContext, SelectionStore};
use crate::types::Item;
use std::sync::Arc;

/// Route of the screen that opened the selector. Deliberately not `Clone`:
/// it is handed back exactly once, by `confirm` or `cancel`.
#[derive(Debug, PartialEq, Eq)]
pub struct ReturnTo(String);

impl ReturnTo {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        if path.trim().is_empty() {
            Self("/".to_string())
        } else {
            Self(path)
        }
    }

    pub fn path(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorOutcome {
    Confirmed,
    Cancelled,
}

/// Where to go after the selector closes.
#[derive(Debug, PartialEq, Eq)]
pub struct Navigation {
    pub path: String,
    pub outcome: SelectorOutcome,
}

pub struct SelectorScreen {
    context: SelectionContext,
    return_to: ReturnTo,
    store: SelectionStore,
    catalog: Arc<dyn Catalog>,
    items: Vec<Item>,
    pending: Vec<String>,
    load_error: Option<String>,
}

impl SelectorScreen {
    /// Seed the pending selection from the store and load the catalog.
    /// Loading is synchronous, so the returned screen is always ready.
    pub fn enter(
        context: SelectionContext,
        return_to: ReturnTo,
        store: SelectionStore,
        catalog: Arc<dyn Catalog>,
    ) -> Self {
        let mut pending: Vec<String> = Vec::new();
        for id in store.read(context) {
            if !pending.contains(&id) {
                pending.push(id);
            }
        }
        let mut screen = Self {
            context,
            return_to,
            store,
            catalog,
            items: Vec::new(),
            pending,
            load_error: None,
        };
        screen.load();
        screen
    }

    fn load(&mut self) {
        let (items, err) = fetch_or_empty(self.catalog.as_ref(), self.context.item_kind());
        self.items = items;
        self.load_error = err.map(|e| e.user_message());
    }

    pub fn context(&self) -> SelectionContext {
        self.context
    }

    pub fn return_path(&self) -> &str {
        self.return_to.path()
    }

    /// Catalog entries, in catalog order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Message from a failed catalog load, if any. The list is empty then.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Shown in place of the list when the catalog has nothing of this kind.
    pub fn empty_notice(&self) -> Option<String> {
        self.items
            .is_empty()
            .then(|| self.context.item_kind().empty_notice())
    }

    /// Entries whose title or content contains `query`, ignoring case.
    pub fn search(&self, query: &str) -> Vec<&Item> {
        let needle = query.trim().to_lowercase();
        self.items
            .iter()
            .filter(|i| {
                needle.is_empty()
                    || i.title.to_lowercase().contains(&needle)
                    || i.content.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.pending.iter().any(|p| p == id)
    }

    /// Chips above the list: selected entries that exist in the catalog.
    pub fn selected_items(&self) -> Vec<&Item> {
        self.items.iter().filter(|i| self.is_selected(&i.id)).collect()
    }

    /// Flip membership of `id` in the pending selection.
    pub fn toggle(&mut self, id: &str) {
        if let Some(pos) = self.pending.iter().position(|p| p == id) {
            self.pending.remove(pos);
        } else {
            self.pending.push(id.to_string());
        }
    }

    pub fn open_creation(&self) -> CreationModal {
        CreationModal::new(self.context.item_kind())
    }

    /// Show a freshly created item and select it. The store is untouched
    /// until `confirm`.
    pub fn accept_created(&mut self, item: Item) {
        if !self.is_selected(&item.id) {
            self.pending.push(item.id.clone());
        }
        if !self.items.iter().any(|i| i.id == item.id) {
            self.items.push(item);
        }
    }

    /// Submit `modal` and, on success, add the result to the screen.
    pub fn create_item(&mut self, modal: &mut CreationModal) -> Result<()> {
        let catalog = Arc::clone(&self.catalog);
        modal.submit(catalog.as_ref(), |item| self.accept_created(item))
    }

    /// Persist the pending selection and return to the caller.
    pub fn confirm(self) -> Navigation {
        self.store.write(self.context, &self.pending);
        tracing::debug!(context = %self.context, count = self.pending.len(), "selection confirmed");
        Navigation {
            path: self.return_to.0,
            outcome: SelectorOutcome::Confirmed,
        }
    }

    /// Return to the caller without writing anything.
    pub fn cancel(self) -> Navigation {
        Navigation {
            path: self.return_to.0,
            outcome: SelectorOutcome::Cancelled,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::selection::MemorySessionStore;
    use crate::types::{ItemKind, PromptType};

    const GENERATION: SelectionContext = SelectionContext::Prompts(PromptType::Generation);

    fn item(id: &str, prompt_type: Option<PromptType>) -> Item {
        Item {
            id: id.to_string(),
            title: format!("Title {id}"),
            content: format!("Body of {id}"),
            tags: Vec::new(),
            prompt_type,
        }
    }

    fn setup(items: Vec<Item>) -> (SelectionStore, Arc<MemoryCatalog>) {
        let store = SelectionStore::new(Arc::new(MemorySessionStore::new()));
        (store, Arc::new(MemoryCatalog::with_items(items)))
    }

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn entry_seeds_pending_from_store() {
        let (store, catalog) = setup(vec![item("p1", Some(PromptType::Generation))]);
        store.write(GENERATION, &ids(&["p1", "p1"]));
        let screen = SelectorScreen::enter(GENERATION, ReturnTo::new("/generate"), store, catalog);
        assert!(screen.load_error().is_none());
        assert_eq!(screen.pending(), ids(&["p1"]).as_slice());
        assert_eq!(screen.selected_items().len(), 1);
    }

    #[test]
    fn toggle_is_symmetric_difference() {
        let (store, catalog) = setup(vec![]);
        let mut screen = SelectorScreen::enter(GENERATION, ReturnTo::new("/"), store, catalog);
        screen.toggle("a");
        screen.toggle("b");
        screen.toggle("a");
        assert_eq!(screen.pending(), ids(&["b"]).as_slice());
    }

    #[test]
    fn cancel_leaves_store_unchanged() {
        let (store, catalog) = setup(vec![
            item("p1", Some(PromptType::Generation)),
            item("p2", Some(PromptType::Generation)),
        ]);
        store.write(GENERATION, &ids(&["p1"]));
        let mut screen =
            SelectorScreen::enter(GENERATION, ReturnTo::new("/generate"), store.clone(), catalog);
        screen.toggle("p1");
        screen.toggle("p2");
        screen.toggle("p3");
        let nav = screen.cancel();
        assert_eq!(nav.outcome, SelectorOutcome::Cancelled);
        assert_eq!(nav.path, "/generate");
        assert_eq!(store.read(GENERATION), ids(&["p1"]));
    }

    #[test]
    fn toggling_does_not_write_until_confirm() {
        let (store, catalog) = setup(vec![]);
        let mut screen = SelectorScreen::enter(GENERATION, ReturnTo::new("/"), store.clone(), catalog);
        screen.toggle("x");
        assert!(store.read(GENERATION).is_empty());
        screen.toggle("y");
        screen.toggle("x");
        let nav = screen.confirm();
        assert_eq!(nav.outcome, SelectorOutcome::Confirmed);
        assert_eq!(store.read(GENERATION), ids(&["y"]));
    }

    #[test]
    fn empty_catalog_shows_notice_not_error() {
        let (store, catalog) = setup(vec![item("s1", None)]);
        let screen = SelectorScreen::enter(
            SelectionContext::Prompts(PromptType::Planner),
            ReturnTo::new("/planner"),
            store,
            catalog,
        );
        assert!(screen.items().is_empty());
        assert!(screen.load_error().is_none());
        assert_eq!(screen.empty_notice().as_deref(), Some("No planner prompts yet."));
    }

    #[test]
    fn failed_load_is_an_empty_list_with_message() {
        let (store, catalog) = setup(vec![item("s1", None)]);
        catalog.set_offline(true);
        let screen =
            SelectorScreen::enter(SelectionContext::Supplementals, ReturnTo::new("/"), store, catalog);
        assert!(screen.items().is_empty());
        assert!(screen.load_error().is_some());
    }

    #[test]
    fn inline_creation_selects_without_writing() {
        let (store, catalog) = setup(vec![item("s1", None)]);
        store.write(SelectionContext::Supplementals, &ids(&["s1"]));
        let mut screen = SelectorScreen::enter(
            SelectionContext::Supplementals,
            ReturnTo::new("/critique"),
            store.clone(),
            catalog.clone(),
        );

        let mut modal = screen.open_creation();
        assert_eq!(modal.kind(), ItemKind::Supplemental);
        modal.title = "S2".to_string();
        modal.content = "More facts".to_string();
        screen.create_item(&mut modal).unwrap();

        let new_id = screen.items().last().unwrap().id.clone();
        assert!(screen.is_selected(&new_id));
        assert_eq!(store.read(SelectionContext::Supplementals), ids(&["s1"]));

        screen.confirm();
        assert_eq!(
            store.read(SelectionContext::Supplementals),
            vec!["s1".to_string(), new_id]
        );
    }

    #[test]
    fn search_matches_title_or_content() {
        let mut a = item("s1", None);
        a.title = "Brand Voice".to_string();
        let mut b = item("s2", None);
        b.content = "Quarterly revenue figures".to_string();
        let (store, catalog) = setup(vec![a, b, item("s3", None)]);
        let screen =
            SelectorScreen::enter(SelectionContext::Supplementals, ReturnTo::new("/"), store, catalog);
        assert_eq!(screen.search("voice").len(), 1);
        assert_eq!(screen.search("REVENUE")[0].id, "s2");
        assert_eq!(screen.search("  ").len(), 3);
    }

    #[test]
    fn blank_return_path_goes_home() {
        assert_eq!(ReturnTo::new("").path(), "/");
    }
}
