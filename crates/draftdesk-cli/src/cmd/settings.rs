use crate::output::print_json;
use crate::root::Desk;
use anyhow::Context;
use clap::Subcommand;
use draftdesk_core::types::{Settings, SettingsPatch};

#[derive(Subcommand)]
pub enum SettingsSubcommand {
    /// Show the refine assistant's system prompts
    Show,

    /// Change one or both system prompts
    Set {
        #[arg(long)]
        prompt_system: Option<String>,
        #[arg(long)]
        supplement_system: Option<String>,
    },
}

pub fn run(desk: &Desk, subcmd: SettingsSubcommand, json: bool) -> anyhow::Result<()> {
    let settings = match subcmd {
        SettingsSubcommand::Show => desk
            .backend()
            .get_settings()
            .context("failed to load settings")?,
        SettingsSubcommand::Set {
            prompt_system,
            supplement_system,
        } => {
            if prompt_system.is_none() && supplement_system.is_none() {
                anyhow::bail!("nothing to set: pass --prompt-system or --supplement-system");
            }
            let patch = SettingsPatch {
                prompt_system,
                supplement_system,
            };
            desk.backend()
                .update_settings(&patch)
                .context("failed to update settings")?
        }
    };

    if json {
        return print_json(&settings);
    }
    print_settings(&settings);
    Ok(())
}

fn print_settings(settings: &Settings) {
    let show = |s: &str| {
        if s.trim().is_empty() {
            "(unset)".to_string()
        } else {
            s.trim_end().to_string()
        }
    };
    println!("prompt_system:");
    println!("{}", show(&settings.prompt_system));
    println!();
    println!("supplement_system:");
    println!("{}", show(&settings.supplement_system));
}
