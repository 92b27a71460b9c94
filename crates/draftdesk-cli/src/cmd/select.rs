use crate::output::{preview, print_json, print_table};
use crate::root::Desk;
use anyhow::Context;
use clap::Args;
use draftdesk_core::selection::SelectionContext;
use draftdesk_core::selector::{ReturnTo, SelectorOutcome, SelectorScreen};

/// One visit to the selector screen: toggles and inline creations are
/// applied to the pending selection, then it is confirmed or discarded.
#[derive(Args)]
pub struct SelectArgs {
    /// prompts:generation, prompts:critique, prompts:planner, or supplementals
    pub context: String,

    /// Route to return to when the selector closes
    #[arg(long, default_value = "/")]
    pub return_to: String,

    /// Flip selection of an item (repeatable)
    #[arg(long = "toggle", value_name = "ID")]
    pub toggles: Vec<String>,

    /// Create an item inline and select it
    #[arg(long, requires = "create_content")]
    pub create_title: Option<String>,
    #[arg(long, requires = "create_title")]
    pub create_content: Option<String>,
    #[arg(long = "create-tag", value_name = "TAG")]
    pub create_tags: Vec<String>,

    /// Only list items matching this text
    #[arg(long)]
    pub search: Option<String>,

    /// Save the pending selection
    #[arg(long, conflicts_with = "cancel", required_unless_present = "cancel")]
    pub confirm: bool,

    /// Leave without saving anything
    #[arg(long)]
    pub cancel: bool,
}

pub fn run(desk: &Desk, args: SelectArgs, json: bool) -> anyhow::Result<()> {
    let context: SelectionContext = args.context.parse()?;
    let mut screen = SelectorScreen::enter(
        context,
        ReturnTo::new(args.return_to),
        desk.selections(),
        desk.catalog(),
    );
    if let Some(err) = screen.load_error() {
        eprintln!("warning: {err}");
    }

    let mut created = None;
    if let Some(title) = args.create_title {
        let mut modal = screen.open_creation();
        modal.title = title;
        modal.content = args.create_content.unwrap_or_default();
        modal.tags_input = args.create_tags.join(",");
        screen
            .create_item(&mut modal)
            .with_context(|| format!("failed to create {}", context.item_kind()))?;
        created = screen.items().last().cloned();
    }

    for id in &args.toggles {
        screen.toggle(id);
        // With no catalog there is nothing to check against.
        let unknown = screen.load_error().is_none()
            && screen.pending().contains(id)
            && !screen.items().iter().any(|i| &i.id == id);
        if unknown {
            eprintln!(
                "warning: '{id}' is not in the {} catalog; forms will drop it",
                context.item_kind()
            );
        }
    }

    let query = args.search.unwrap_or_default();
    let listing: Vec<(String, String, bool)> = screen
        .search(&query)
        .into_iter()
        .map(|i| (i.id.clone(), i.title.clone(), screen.is_selected(&i.id)))
        .collect();
    let notice = screen.empty_notice();
    let pending = screen.pending().to_vec();

    let nav = if args.confirm {
        screen.confirm()
    } else {
        screen.cancel()
    };
    let outcome = match nav.outcome {
        SelectorOutcome::Confirmed => "confirmed",
        SelectorOutcome::Cancelled => "cancelled",
    };

    if json {
        let items: Vec<_> = listing
            .iter()
            .map(|(id, title, selected)| {
                serde_json::json!({ "id": id, "title": title, "selected": selected })
            })
            .collect();
        return print_json(&serde_json::json!({
            "context": context.to_string(),
            "outcome": outcome,
            "return_to": nav.path,
            "selected": pending,
            "items": items,
            "created": created,
        }));
    }

    println!("Selecting {context}");
    if let Some(notice) = notice {
        println!("{notice}");
    } else {
        let rows = listing
            .iter()
            .map(|(id, title, selected)| {
                let mark = if *selected { "[x]" } else { "[ ]" };
                vec![mark.to_string(), id.clone(), preview(title, 48)]
            })
            .collect();
        print_table(&["SEL", "ID", "TITLE"], rows);
    }
    if let Some(item) = &created {
        println!("Created {} ({})", item.title, item.id);
    }
    match nav.outcome {
        SelectorOutcome::Confirmed => {
            println!("Saved {} selected. Returning to {}", pending.len(), nav.path)
        }
        SelectorOutcome::Cancelled => println!("Selection unchanged. Returning to {}", nav.path),
    }
    Ok(())
}
