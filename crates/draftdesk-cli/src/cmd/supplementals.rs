use crate::cmd::prompts::collect_tags;
use crate::output::{preview, print_json, print_table};
use crate::root::Desk;
use anyhow::Context;
use clap::Subcommand;
use draftdesk_core::types::{Item, ItemDraft};

#[derive(Subcommand)]
pub enum SupplementalsSubcommand {
    /// List supplemental info
    List {
        /// Case-insensitive match on title or content
        #[arg(long)]
        search: Option<String>,
    },

    /// Create a supplemental info entry
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Replace a supplemental info entry
    Update {
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Delete a supplemental info entry
    Delete { id: String },
}

pub fn run(desk: &Desk, subcmd: SupplementalsSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        SupplementalsSubcommand::List { search } => list(desk, search.as_deref(), json),
        SupplementalsSubcommand::Create {
            title,
            content,
            tags,
        } => {
            let draft = ItemDraft::new(title, content).with_tags(collect_tags(&tags));
            let item = desk
                .backend()
                .create_supplemental(&draft)
                .context("failed to create supplemental info")?;
            desk.invalidate_catalog();
            report(&item, "Created", json)
        }
        SupplementalsSubcommand::Update {
            id,
            title,
            content,
            tags,
        } => {
            let draft = ItemDraft::new(title, content).with_tags(collect_tags(&tags));
            let item = desk
                .backend()
                .update_supplemental(&id, &draft)
                .with_context(|| format!("failed to update supplemental info '{id}'"))?;
            desk.invalidate_catalog();
            report(&item, "Updated", json)
        }
        SupplementalsSubcommand::Delete { id } => {
            desk.backend()
                .delete_supplemental(&id)
                .with_context(|| format!("failed to delete supplemental info '{id}'"))?;
            desk.invalidate_catalog();
            if json {
                return print_json(&serde_json::json!({ "deleted": id }));
            }
            println!("Deleted supplemental info {id}");
            Ok(())
        }
    }
}

fn list(desk: &Desk, search: Option<&str>, json: bool) -> anyhow::Result<()> {
    let needle = search.map(|s| s.trim().to_lowercase()).unwrap_or_default();
    let items: Vec<Item> = desk
        .backend()
        .list_supplementals()
        .context("failed to list supplemental info")?
        .into_iter()
        .filter(|i| {
            needle.is_empty()
                || i.title.to_lowercase().contains(&needle)
                || i.content.to_lowercase().contains(&needle)
        })
        .collect();

    if json {
        return print_json(&items);
    }
    if items.is_empty() {
        println!("No supplemental info.");
        return Ok(());
    }
    let rows = items
        .iter()
        .map(|i| {
            vec![
                i.id.clone(),
                preview(&i.title, 32),
                preview(&i.content, 48),
                i.tags.join(","),
            ]
        })
        .collect();
    print_table(&["ID", "TITLE", "CONTENT", "TAGS"], rows);
    Ok(())
}

fn report(item: &Item, verb: &str, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(item);
    }
    println!("{verb} supplemental info {}: {}", item.id, item.title);
    Ok(())
}
