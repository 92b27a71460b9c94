use crate::output::{print_document, print_json, warn_load_errors};
use crate::root::Desk;
use anyhow::Context;
use clap::Subcommand;
use draftdesk_core::form::PlannerForm;
use draftdesk_core::types::Role;

#[derive(Subcommand)]
pub enum PlanSubcommand {
    /// Ask for a first outline, replacing any previous conversation
    Start {
        #[arg(long)]
        topic: String,
    },

    /// Send a follow-up message about the current outline
    Continue {
        #[arg(long)]
        message: String,
    },

    /// Show the planner conversation kept in this session
    Show,

    /// Forget the planner conversation
    Reset,
}

pub fn run(desk: &Desk, subcmd: PlanSubcommand, json: bool) -> anyhow::Result<()> {
    let form = PlannerForm::mount(desk.selections(), desk.catalog());
    run_form(desk, form, subcmd, json)
}

pub fn run_form(
    desk: &Desk,
    mut form: PlannerForm,
    subcmd: PlanSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    match subcmd {
        PlanSubcommand::Start { topic } => {
            warn_load_errors(&form.selections);
            form.topic = topic;
            let outline = form
                .start(desk.backend())
                .context("failed to plan outline")?;
            report(outline, json)
        }
        PlanSubcommand::Continue { message } => {
            warn_load_errors(&form.selections);
            let outline = form
                .continue_plan(&message, desk.backend())
                .context("failed to continue plan")?;
            report(outline, json)
        }
        PlanSubcommand::Show => {
            if json {
                return print_json(&serde_json::json!({
                    "topic": form.topic,
                    "messages": form.messages(),
                }));
            }
            if form.messages().is_empty() {
                println!("No plan in this session. Run `draftdesk plan start --topic ...`.");
                return Ok(());
            }
            println!("Topic: {}", form.topic);
            for m in form.messages() {
                let who = match m.role {
                    Role::User => "you",
                    Role::Assistant => "planner",
                    Role::System => "system",
                };
                println!();
                println!("[{who}]");
                println!("{}", m.content.trim_end());
            }
            Ok(())
        }
        PlanSubcommand::Reset => {
            form.reset();
            if json {
                return print_json(&serde_json::json!({ "reset": true }));
            }
            println!("Planner conversation cleared.");
            Ok(())
        }
    }
}

fn report(outline: &str, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&serde_json::json!({ "outline": outline }));
    }
    print_document("Outline", outline);
    Ok(())
}
