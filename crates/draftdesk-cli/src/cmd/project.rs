use crate::cmd::critique::{self, CritiqueArgs};
use crate::cmd::generate::{self, GenerateArgs};
use crate::cmd::plan::{self, PlanSubcommand};
use crate::cmd::projects::print_project;
use crate::output::print_json;
use crate::root::Desk;
use anyhow::Context;
use clap::Subcommand;
use draftdesk_core::form::{CritiqueForm, GenerateForm, PlannerForm};
use draftdesk_core::project::{ProjectEditor, ProjectTab};

#[derive(Subcommand)]
pub enum ProjectSubcommand {
    /// Open the project dashboard, apply edits, and optionally save them
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Switch the active tab: generate, critique, or planner
        #[arg(long)]
        tab: Option<String>,
        /// Undo this many of the edits above before saving
        #[arg(long, default_value_t = 0)]
        undo: usize,
        /// Send changed fields to the backend
        #[arg(long)]
        save: bool,
    },

    /// Generate an article from the project's Generate tab
    Generate {
        id: String,
        #[command(flatten)]
        args: GenerateArgs,
    },

    /// Critique a draft from the project's Critique tab
    Critique {
        id: String,
        #[command(flatten)]
        args: CritiqueArgs,
    },

    /// Plan an outline from the project's Planner tab
    Plan {
        id: String,
        #[command(subcommand)]
        subcommand: PlanSubcommand,
    },
}

pub fn run(desk: &Desk, subcmd: ProjectSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ProjectSubcommand::Edit {
            id,
            title,
            description,
            tab,
            undo,
            save,
        } => edit(desk, &id, title, description, tab.as_deref(), undo, save, json),
        ProjectSubcommand::Generate { id, args } => {
            let route = open_tab(desk, &id, ProjectTab::Generate)?;
            let form = GenerateForm::mount_at(route, desk.selections(), desk.catalog());
            generate::submit(desk, form, args, json)
        }
        ProjectSubcommand::Critique { id, args } => {
            let route = open_tab(desk, &id, ProjectTab::Critique)?;
            let form = CritiqueForm::mount_at(route, desk.selections(), desk.catalog());
            critique::submit(desk, form, args, json)
        }
        ProjectSubcommand::Plan { id, subcommand } => {
            let route = open_tab(desk, &id, ProjectTab::Planner)?;
            let form = PlannerForm::mount_at(route, desk.selections(), desk.catalog());
            plan::run_form(desk, form, subcommand, json)
        }
    }
}

/// Switch the dashboard to `tab` and return the route its form lives under.
fn open_tab(desk: &Desk, id: &str, tab: ProjectTab) -> anyhow::Result<String> {
    let project = desk
        .backend()
        .get_project(id)
        .with_context(|| format!("failed to load project '{id}'"))?;
    let route = tab.route(&project.id);
    let mut editor = ProjectEditor::open(project, desk.session());
    editor.set_tab(tab);
    tracing::debug!(%route, "project tab opened");
    Ok(route)
}

#[allow(clippy::too_many_arguments)]
fn edit(
    desk: &Desk,
    id: &str,
    title: Option<String>,
    description: Option<String>,
    tab: Option<&str>,
    undo: usize,
    save: bool,
    json: bool,
) -> anyhow::Result<()> {
    let tab = tab.map(str::parse::<ProjectTab>).transpose()?;
    let project = desk
        .backend()
        .get_project(id)
        .with_context(|| format!("failed to load project '{id}'"))?;
    let mut editor = ProjectEditor::open(project, desk.session());

    if let Some(t) = title {
        editor.set_title(t);
    }
    if let Some(d) = description {
        editor.set_description(d);
    }
    if let Some(t) = tab {
        editor.set_tab(t);
    }
    let mut undone = 0;
    while undone < undo && editor.undo() {
        undone += 1;
    }

    let pending = editor.pending_changes();
    let saved = if save {
        editor
            .save(desk.backend())
            .with_context(|| format!("failed to save project '{id}'"))?
    } else {
        false
    };

    if json {
        return print_json(&serde_json::json!({
            "project": editor.project(),
            "title": editor.title(),
            "description": editor.description(),
            "tab": editor.tab(),
            "undone": undone,
            "pending": pending,
            "saved": saved,
        }));
    }

    print_project(editor.project());
    println!();
    println!("tab: {}", editor.tab());
    if undone > 0 {
        println!("undid {undone} edit(s)");
    }
    if saved {
        println!("Saved changes.");
    } else if !pending.is_empty() {
        println!(
            "Unsaved changes: title={:?} description={:?} (pass --save to send them)",
            editor.title(),
            editor.description()
        );
    }
    Ok(())
}
