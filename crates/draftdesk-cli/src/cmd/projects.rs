use crate::output::{preview, print_json, print_table};
use crate::root::Desk;
use anyhow::Context;
use clap::{Args, Subcommand};
use draftdesk_core::types::{Project, ProjectPatch};

#[derive(Subcommand)]
pub enum ProjectsSubcommand {
    /// List projects
    List,

    /// Create a project
    Create {
        #[command(flatten)]
        fields: ProjectFields,
    },

    /// Show a project
    Show { id: String },

    /// Update fields of a project
    Update {
        id: String,
        #[command(flatten)]
        fields: ProjectFields,
    },

    /// Delete a project
    Delete { id: String },
}

#[derive(Args)]
pub struct ProjectFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub custom_instructions: Option<String>,
    #[arg(long)]
    pub planning: Option<String>,
}

impl From<ProjectFields> for ProjectPatch {
    fn from(f: ProjectFields) -> Self {
        ProjectPatch {
            title: f.title,
            description: f.description,
            custom_instructions: f.custom_instructions,
            planning: f.planning,
        }
    }
}

pub fn run(desk: &Desk, subcmd: ProjectsSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ProjectsSubcommand::List => list(desk, json),
        ProjectsSubcommand::Create { fields } => {
            let project = desk
                .backend()
                .create_project(&fields.into())
                .context("failed to create project")?;
            if json {
                return print_json(&project);
            }
            println!("Created project {}: {}", project.id, project.title);
            Ok(())
        }
        ProjectsSubcommand::Show { id } => {
            let project = desk
                .backend()
                .get_project(&id)
                .with_context(|| format!("failed to load project '{id}'"))?;
            if json {
                return print_json(&project);
            }
            print_project(&project);
            Ok(())
        }
        ProjectsSubcommand::Update { id, fields } => {
            let patch: ProjectPatch = fields.into();
            if patch.is_empty() {
                anyhow::bail!("nothing to update: pass at least one field");
            }
            let project = desk
                .backend()
                .update_project(&id, &patch)
                .with_context(|| format!("failed to update project '{id}'"))?;
            if json {
                return print_json(&project);
            }
            println!("Updated project {}: {}", project.id, project.title);
            Ok(())
        }
        ProjectsSubcommand::Delete { id } => {
            desk.backend()
                .delete_project(&id)
                .with_context(|| format!("failed to delete project '{id}'"))?;
            if json {
                return print_json(&serde_json::json!({ "deleted": id }));
            }
            println!("Deleted project {id}");
            Ok(())
        }
    }
}

fn list(desk: &Desk, json: bool) -> anyhow::Result<()> {
    let projects = desk
        .backend()
        .list_projects()
        .context("failed to list projects")?;
    if json {
        return print_json(&projects);
    }
    if projects.is_empty() {
        println!("No projects.");
        return Ok(());
    }
    let rows = projects
        .iter()
        .map(|p| {
            vec![
                p.id.clone(),
                preview(&p.title, 40),
                preview(p.description.as_deref().unwrap_or(""), 48),
            ]
        })
        .collect();
    print_table(&["ID", "TITLE", "DESCRIPTION"], rows);
    Ok(())
}

pub fn print_project(project: &Project) {
    println!("{} ({})", project.title, project.id);
    if let Some(d) = project.description.as_deref().filter(|d| !d.is_empty()) {
        println!("{d}");
    }
    if let Some(ci) = &project.custom_instructions {
        println!();
        println!("Custom instructions:");
        println!("{}", ci.trim_end());
    }
    if let Some(plan) = &project.planning {
        println!();
        println!("Planning:");
        println!("{}", plan.trim_end());
    }
}
