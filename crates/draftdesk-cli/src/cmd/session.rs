use crate::output::{preview, print_json, print_table};
use crate::root::Desk;
use anyhow::Context;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum SessionSubcommand {
    /// Show every key stored in this session
    Show,

    /// End the session, discarding all stored selections and state
    Clear,
}

pub fn run(desk: &Desk, subcmd: SessionSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        SessionSubcommand::Show => show(desk, json),
        SessionSubcommand::Clear => {
            let removed = desk
                .session_file()
                .clear()
                .context("failed to clear session")?;
            if json {
                return print_json(&serde_json::json!({ "cleared": removed }));
            }
            if removed {
                println!("Session cleared.");
            } else {
                println!("Session was already empty.");
            }
            Ok(())
        }
    }
}

fn show(desk: &Desk, json: bool) -> anyhow::Result<()> {
    let session = desk.session();
    let mut entries = serde_json::Map::new();
    for key in session.keys().context("failed to read session")? {
        if let Some(value) = session.get(&key)? {
            entries.insert(key, serde_json::Value::String(value));
        }
    }

    if json {
        return print_json(&serde_json::json!({
            "path": desk.session_file().path(),
            "entries": entries,
        }));
    }
    println!("session file: {}", desk.session_file().path().display());
    if entries.is_empty() {
        println!("(empty)");
        return Ok(());
    }
    let rows = entries
        .iter()
        .map(|(k, v)| vec![k.clone(), preview(v.as_str().unwrap_or_default(), 60)])
        .collect();
    print_table(&["KEY", "VALUE"], rows);
    Ok(())
}
