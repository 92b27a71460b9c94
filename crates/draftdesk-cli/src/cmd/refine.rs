use crate::output::{print_document, print_json};
use crate::root::Desk;
use anyhow::Context;
use clap::Args;
use draftdesk_core::refine::{RefineMode, RefineRequest};
use std::path::PathBuf;

#[derive(Args)]
pub struct RefineArgs {
    /// prompt or supplement
    #[arg(long)]
    pub mode: String,

    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub text: Option<String>,

    /// Read the text to refine from a file
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// What to change
    #[arg(long)]
    pub instruction: Option<String>,
}

pub fn run(desk: &Desk, args: RefineArgs, json: bool) -> anyhow::Result<()> {
    let mode: RefineMode = args.mode.parse()?;
    let text = match (args.text, args.file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => anyhow::bail!("pass --text or --file"),
    };

    let settings = desk
        .backend()
        .get_settings()
        .context("failed to load settings")?;
    let req = RefineRequest::new(mode, text, args.instruction.as_deref(), &settings)?;
    let refined = desk
        .backend()
        .refine(&req)
        .with_context(|| format!("failed to refine {mode} text"))?;

    if json {
        return print_json(&serde_json::json!({ "mode": mode, "refined": refined }));
    }
    print_document("Refined", &refined);
    Ok(())
}
