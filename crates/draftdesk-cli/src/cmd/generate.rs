use crate::output::{print_document, print_json, warn_load_errors};
use crate::root::Desk;
use anyhow::Context;
use clap::Args;
use draftdesk_core::form::GenerateForm;

#[derive(Args)]
pub struct GenerateArgs {
    /// What the article is about
    #[arg(long)]
    pub topic: String,

    /// Extra guidance for this article only
    #[arg(long)]
    pub instructions: Option<String>,
}

pub fn run(desk: &Desk, args: GenerateArgs, json: bool) -> anyhow::Result<()> {
    let form = GenerateForm::mount(desk.selections(), desk.catalog());
    submit(desk, form, args, json)
}

/// Fill in a mounted form and send it.
pub fn submit(desk: &Desk, mut form: GenerateForm, args: GenerateArgs, json: bool) -> anyhow::Result<()> {
    warn_load_errors(&form.selections);
    form.topic = args.topic;
    form.instructions = args.instructions.unwrap_or_default();

    let route = form.selections.route().to_string();
    let article = form
        .submit(desk.backend())
        .context("failed to generate article")?;

    if json {
        return print_json(&serde_json::json!({
            "route": route,
            "article": article,
        }));
    }
    print_document("Article", article);
    Ok(())
}
