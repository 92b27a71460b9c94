use crate::output::{print_document, print_json, warn_load_errors};
use crate::root::Desk;
use anyhow::Context;
use clap::Args;
use draftdesk_core::form::CritiqueForm;
use std::path::PathBuf;

#[derive(Args)]
pub struct CritiqueArgs {
    /// Markdown file to critique
    #[arg(long, conflicts_with = "markdown", required_unless_present = "markdown")]
    pub file: Option<PathBuf>,

    /// Markdown text to critique
    #[arg(long)]
    pub markdown: Option<String>,
}

pub fn run(desk: &Desk, args: CritiqueArgs, json: bool) -> anyhow::Result<()> {
    let form = CritiqueForm::mount(desk.selections(), desk.catalog());
    submit(desk, form, args, json)
}

pub fn submit(desk: &Desk, mut form: CritiqueForm, args: CritiqueArgs, json: bool) -> anyhow::Result<()> {
    let markdown = match (args.file, args.markdown) {
        (Some(path), _) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, Some(text)) => text,
        (None, None) => anyhow::bail!("pass --file or --markdown"),
    };

    warn_load_errors(&form.selections);
    form.markdown = markdown;
    let route = form.selections.route().to_string();
    let critique = form
        .submit(desk.backend())
        .context("failed to critique draft")?;

    if json {
        return print_json(&serde_json::json!({
            "route": route,
            "critique": critique,
        }));
    }
    print_document("Critique", critique);
    Ok(())
}
