use crate::output::print_json;
use crate::root::Desk;
use clap::Subcommand;
use draftdesk_core::config::WarnLevel;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Validate the config for common mistakes
    Validate,

    /// Show the effective configuration and resolved paths
    Show,
}

pub fn run(desk: &Desk, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Validate => validate(desk, json),
        ConfigSubcommand::Show => show(desk, json),
    }
}

fn validate(desk: &Desk, json: bool) -> anyhow::Result<()> {
    let warnings = desk.config.validate();

    if json {
        print_json(&serde_json::json!({ "warnings": warnings }))?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}

fn show(desk: &Desk, json: bool) -> anyhow::Result<()> {
    let sessions_dir = desk.config.sessions_dir(&desk.data_dir);
    if json {
        return print_json(&serde_json::json!({
            "data_dir": desk.data_dir,
            "sessions_dir": sessions_dir,
            "session_file": desk.session_file().path(),
            "config": desk.config,
        }));
    }
    println!("data dir:     {}", desk.data_dir.display());
    println!("sessions dir: {}", sessions_dir.display());
    println!("session file: {}", desk.session_file().path().display());
    println!();
    print!("{}", serde_yaml::to_string(&desk.config)?);
    Ok(())
}
