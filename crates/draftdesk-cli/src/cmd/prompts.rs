use crate::output::{preview, print_json, print_table};
use crate::root::Desk;
use anyhow::Context;
use clap::Subcommand;
use draftdesk_core::types::{parse_tags, Item, ItemDraft, ItemPatch, PromptType};

#[derive(Subcommand)]
pub enum PromptsSubcommand {
    /// List prompts
    List {
        /// Only prompts of this type: generation, critique, or planner
        #[arg(long = "type", value_name = "TYPE")]
        prompt_type: Option<String>,
        /// Only prompts carrying this tag
        #[arg(long)]
        tag: Option<String>,
    },

    /// Show one prompt in full
    Show { id: String },

    /// Create a prompt
    Create {
        #[arg(long = "type", value_name = "TYPE")]
        prompt_type: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        /// Tag (repeatable, or comma-separated)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Update fields of a prompt
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        /// Replace the tag list (repeatable, or comma-separated)
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long = "type", value_name = "TYPE")]
        prompt_type: Option<String>,
    },

    /// Delete a prompt
    Delete { id: String },
}

pub fn run(desk: &Desk, subcmd: PromptsSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        PromptsSubcommand::List { prompt_type, tag } => {
            list(desk, prompt_type.as_deref(), tag.as_deref(), json)
        }
        PromptsSubcommand::Show { id } => show(desk, &id, json),
        PromptsSubcommand::Create {
            prompt_type,
            title,
            content,
            tags,
        } => create(desk, &prompt_type, title, content, &tags, json),
        PromptsSubcommand::Update {
            id,
            title,
            content,
            tags,
            prompt_type,
        } => update(desk, &id, title, content, &tags, prompt_type.as_deref(), json),
        PromptsSubcommand::Delete { id } => delete(desk, &id, json),
    }
}

/// Flatten `--tag a --tag b,c` into one list.
pub fn collect_tags(raw: &[String]) -> Vec<String> {
    parse_tags(&raw.join(","))
}

fn list(desk: &Desk, prompt_type: Option<&str>, tag: Option<&str>, json: bool) -> anyhow::Result<()> {
    let filter = prompt_type.map(str::parse::<PromptType>).transpose()?;
    let prompts: Vec<Item> = desk
        .backend()
        .list_prompts()
        .context("failed to list prompts")?
        .into_iter()
        .filter(|p| filter.is_none() || p.prompt_type == filter)
        .filter(|p| tag.map_or(true, |t| p.has_tag(t)))
        .collect();

    if json {
        return print_json(&prompts);
    }
    if prompts.is_empty() {
        println!("No prompts.");
        return Ok(());
    }
    let rows = prompts
        .iter()
        .map(|p| {
            vec![
                p.id.clone(),
                p.prompt_type.map(|t| t.to_string()).unwrap_or_default(),
                preview(&p.title, 40),
                p.tags.join(","),
            ]
        })
        .collect();
    print_table(&["ID", "TYPE", "TITLE", "TAGS"], rows);
    Ok(())
}

fn show(desk: &Desk, id: &str, json: bool) -> anyhow::Result<()> {
    let prompt = desk
        .backend()
        .get_prompt(id)
        .with_context(|| format!("failed to load prompt '{id}'"))?;
    if json {
        return print_json(&prompt);
    }
    print_item(&prompt);
    Ok(())
}

fn create(
    desk: &Desk,
    prompt_type: &str,
    title: String,
    content: String,
    tags: &[String],
    json: bool,
) -> anyhow::Result<()> {
    let prompt_type: PromptType = prompt_type.parse()?;
    let draft = ItemDraft::new(title, content).with_tags(collect_tags(tags));
    let prompt = desk
        .backend()
        .create_prompt(prompt_type, &draft)
        .context("failed to create prompt")?;
    desk.invalidate_catalog();
    if json {
        return print_json(&prompt);
    }
    println!("Created {prompt_type} prompt {}: {}", prompt.id, prompt.title);
    Ok(())
}

fn update(
    desk: &Desk,
    id: &str,
    title: Option<String>,
    content: Option<String>,
    tags: &[String],
    prompt_type: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let patch = ItemPatch {
        title,
        content,
        tags: (!tags.is_empty()).then(|| collect_tags(tags)),
        prompt_type: prompt_type.map(str::parse::<PromptType>).transpose()?,
    };
    if patch.is_empty() {
        anyhow::bail!("nothing to update: pass --title, --content, --tag, or --type");
    }
    let prompt = desk
        .backend()
        .update_prompt(id, &patch)
        .with_context(|| format!("failed to update prompt '{id}'"))?;
    desk.invalidate_catalog();
    if json {
        return print_json(&prompt);
    }
    println!("Updated prompt {}: {}", prompt.id, prompt.title);
    Ok(())
}

fn delete(desk: &Desk, id: &str, json: bool) -> anyhow::Result<()> {
    desk.backend()
        .delete_prompt(id)
        .with_context(|| format!("failed to delete prompt '{id}'"))?;
    desk.invalidate_catalog();
    if json {
        return print_json(&serde_json::json!({ "deleted": id }));
    }
    println!("Deleted prompt {id}");
    Ok(())
}

pub fn print_item(item: &Item) {
    println!("{} ({})", item.title, item.id);
    println!("kind: {}", item.kind());
    if !item.tags.is_empty() {
        println!("tags: {}", item.tags.join(", "));
    }
    println!();
    println!("{}", item.content.trim_end());
}
