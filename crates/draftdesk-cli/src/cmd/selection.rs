use crate::output::{preview, print_json, print_table};
use crate::root::Desk;
use clap::Subcommand;
use draftdesk_core::catalog::fetch_or_empty;
use draftdesk_core::form::ChipList;
use draftdesk_core::selection::SelectionContext;

#[derive(Subcommand)]
pub enum SelectionSubcommand {
    /// Show stored selections (all contexts unless one is given)
    Show { context: Option<String> },

    /// Remove one chip from a selection
    Remove { context: String, id: String },
}

pub fn run(desk: &Desk, subcmd: SelectionSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        SelectionSubcommand::Show { context } => {
            let contexts = match context {
                Some(c) => vec![c.parse::<SelectionContext>()?],
                None => SelectionContext::all().to_vec(),
            };
            show(desk, &contexts, json)
        }
        SelectionSubcommand::Remove { context, id } => {
            let context: SelectionContext = context.parse()?;
            remove(desk, context, &id, json)
        }
    }
}

/// Read-only view: stored ids are listed as-is, with titles where the
/// catalog still has the item.
fn show(desk: &Desk, contexts: &[SelectionContext], json: bool) -> anyhow::Result<()> {
    let store = desk.selections();
    let catalog = desk.catalog();

    let mut rows = Vec::new();
    let mut out = serde_json::Map::new();
    for &context in contexts {
        let ids = store.read(context);
        if ids.is_empty() {
            out.insert(context.to_string(), serde_json::json!([]));
            continue;
        }
        let (items, err) = fetch_or_empty(catalog.as_ref(), context.item_kind());
        let mut entries = Vec::with_capacity(ids.len());
        for id in &ids {
            let title = items.iter().find(|i| &i.id == id).map(|i| i.title.clone());
            let label = match (&title, &err) {
                (Some(t), _) => preview(t, 48),
                (None, Some(_)) => "(catalog unavailable)".to_string(),
                (None, None) => "(no longer in catalog)".to_string(),
            };
            rows.push(vec![context.to_string(), id.clone(), label]);
            entries.push(serde_json::json!({ "id": id, "title": title }));
        }
        out.insert(context.to_string(), serde_json::Value::Array(entries));
    }

    if json {
        return print_json(&out);
    }
    if rows.is_empty() {
        println!("Nothing selected.");
        return Ok(());
    }
    print_table(&["CONTEXT", "ID", "TITLE"], rows);
    Ok(())
}

fn remove(desk: &Desk, context: SelectionContext, id: &str, json: bool) -> anyhow::Result<()> {
    let store = desk.selections();
    let catalog = desk.catalog();
    let mut chips = ChipList::reconcile(context, &store, catalog.as_ref());
    if !chips.remove(id, &store) {
        anyhow::bail!("'{id}' is not selected for {context}");
    }
    if json {
        return print_json(&serde_json::json!({
            "context": context.to_string(),
            "selected": chips.ids(),
        }));
    }
    println!("Removed {id} from {context} ({} left)", chips.items().len());
    Ok(())
}
