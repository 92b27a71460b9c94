use draftdesk_core::catalog::{Catalog, MemoryCatalog};
use draftdesk_core::form::{CritiqueForm, GenerateForm};
use draftdesk_core::selection::{FileSessionStore, SelectionContext, SelectionStore};
use draftdesk_core::selector::SelectorOutcome;
use draftdesk_core::types::{Item, ItemKind, PromptType};
use std::sync::Arc;
use tempfile::TempDir;

fn prompt(id: &str, t: PromptType) -> Item {
    Item {
        id: id.to_string(),
        title: format!("Prompt {id}"),
        content: format!("Use style {id}"),
        tags: Vec::new(),
        prompt_type: Some(t),
    }
}

fn supplemental(id: &str) -> Item {
    Item {
        id: id.to_string(),
        title: format!("Info {id}"),
        content: format!("Fact sheet {id}"),
        tags: Vec::new(),
        prompt_type: None,
    }
}

fn file_store(dir: &TempDir) -> SelectionStore {
    let session = FileSessionStore::for_session(dir.path(), "default").unwrap();
    SelectionStore::new(Arc::new(session))
}

fn ids(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

const GENERATION: SelectionContext = SelectionContext::Prompts(PromptType::Generation);
const CRITIQUE: SelectionContext = SelectionContext::Prompts(PromptType::Critique);

#[test]
fn unchecking_a_prompt_in_the_selector() {
    let dir = TempDir::new().unwrap();
    let catalog = Arc::new(MemoryCatalog::with_items(vec![
        prompt("P1", PromptType::Generation),
        prompt("P2", PromptType::Generation),
    ]));
    let store = file_store(&dir);
    store.write(GENERATION, &ids(&["P1", "P2"]));

    let mut form = GenerateForm::mount(store, catalog.clone());
    let mut selector = form.selections.open_prompt_selector();
    selector.toggle("P2");
    let nav = selector.confirm();
    assert_eq!(nav.path, "/generate");

    // A fresh process sees the confirmed selection on disk.
    let reopened = file_store(&dir);
    assert_eq!(reopened.read(GENERATION), ids(&["P1"]));

    form.selections.refresh();
    let chips: Vec<&str> = form
        .selections
        .prompts()
        .items()
        .iter()
        .map(|i| i.id.as_str())
        .collect();
    assert_eq!(chips, vec!["P1"]);
}

#[test]
fn cancel_after_inline_creation_keeps_item_but_not_selection() {
    let dir = TempDir::new().unwrap();
    let catalog = Arc::new(MemoryCatalog::with_items(vec![supplemental("S1")]));
    let store = file_store(&dir);
    store.write(SelectionContext::Supplementals, &ids(&["S1"]));

    let form = CritiqueForm::mount(store.clone(), catalog.clone());
    let mut selector = form.selections.open_supplemental_selector();
    let mut modal = selector.open_creation();
    modal.title = "S2".to_string();
    modal.content = "Extra context".to_string();
    selector.create_item(&mut modal).unwrap();
    assert_eq!(selector.pending().len(), 2);

    let nav = selector.cancel();
    assert_eq!(nav.outcome, SelectorOutcome::Cancelled);
    assert_eq!(nav.path, "/critique");
    assert_eq!(store.read(SelectionContext::Supplementals), ids(&["S1"]));

    let all = catalog.fetch_all(ItemKind::Supplemental).unwrap();
    assert!(all.iter().any(|i| i.title == "S2"));
}

#[test]
fn prompt_contexts_are_isolated() {
    let dir = TempDir::new().unwrap();
    let catalog = Arc::new(MemoryCatalog::with_items(vec![
        prompt("g1", PromptType::Generation),
        prompt("c1", PromptType::Critique),
    ]));
    let store = file_store(&dir);
    store.write(CRITIQUE, &ids(&["c1"]));

    let generate = GenerateForm::mount(store.clone(), catalog.clone());
    let mut selector = generate.selections.open_prompt_selector();
    selector.toggle("g1");
    selector.confirm();

    assert_eq!(store.read(GENERATION), ids(&["g1"]));
    assert_eq!(store.read(CRITIQUE), ids(&["c1"]));
}

#[test]
fn deleted_items_vanish_from_forms() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir);
    store.write(GENERATION, &ids(&["g1", "g2"]));

    // g1 was deleted on the backend since the selection was made.
    let catalog = Arc::new(MemoryCatalog::with_items(vec![prompt(
        "g2",
        PromptType::Generation,
    )]));
    let form = GenerateForm::mount(store.clone(), catalog);
    assert_eq!(form.selections.prompts().ids(), ids(&["g2"]));
    assert_eq!(store.read(GENERATION), ids(&["g2"]));
}

#[test]
fn unread_context_is_empty() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir);
    for ctx in SelectionContext::all() {
        assert!(store.read(*ctx).is_empty(), "{ctx} should start empty");
    }
}
