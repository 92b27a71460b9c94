mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    config::ConfigSubcommand, critique::CritiqueArgs, generate::GenerateArgs,
    plan::PlanSubcommand, project::ProjectSubcommand, projects::ProjectsSubcommand,
    prompts::PromptsSubcommand, refine::RefineArgs, select::SelectArgs,
    selection::SelectionSubcommand, session::SessionSubcommand, settings::SettingsSubcommand,
    supplementals::SupplementalsSubcommand,
};
use draftdesk_core::paths::DEFAULT_SESSION;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "draftdesk",
    about = "Draft, critique, and plan content with reusable prompts and supplemental info",
    version,
    propagate_version = true
)]
struct Cli {
    /// Data directory (default: ~/.draftdesk)
    #[arg(long, global = true, env = "DRAFTDESK_HOME")]
    data_dir: Option<PathBuf>,

    /// Backend base URL, overriding config.yaml
    #[arg(long, global = true, env = "DRAFTDESK_BACKEND_URL")]
    backend: Option<String>,

    /// Session id; selections are kept per session
    #[arg(long, global = true, env = "DRAFTDESK_SESSION", default_value = DEFAULT_SESSION)]
    session: String,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Log requests and store activity to stderr
    #[arg(long, global = true, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage prompts
    Prompts {
        #[command(subcommand)]
        subcommand: PromptsSubcommand,
    },

    /// Manage supplemental info
    Supplementals {
        #[command(subcommand)]
        subcommand: SupplementalsSubcommand,
    },

    /// Manage projects
    Projects {
        #[command(subcommand)]
        subcommand: ProjectsSubcommand,
    },

    /// Work inside a project dashboard
    Project {
        #[command(subcommand)]
        subcommand: ProjectSubcommand,
    },

    /// Show or change the refine assistant's system prompts
    Settings {
        #[command(subcommand)]
        subcommand: SettingsSubcommand,
    },

    /// Pick prompts or supplemental info for a form
    Select(SelectArgs),

    /// Inspect or edit stored selections
    Selection {
        #[command(subcommand)]
        subcommand: SelectionSubcommand,
    },

    /// Generate an article from the selected generation prompt
    Generate(GenerateArgs),

    /// Critique a markdown draft with the selected critique prompt
    Critique(CritiqueArgs),

    /// Plan an outline with the selected planner prompt
    Plan {
        #[command(subcommand)]
        subcommand: PlanSubcommand,
    },

    /// Rewrite prompt or supplemental text with the assistant
    Refine(RefineArgs),

    /// Inspect or end the current session
    Session {
        #[command(subcommand)]
        subcommand: SessionSubcommand,
    },

    /// Validate or show the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let opts = root::GlobalOpts {
        data_dir: cli.data_dir.as_deref(),
        backend: cli.backend.as_deref(),
        session: &cli.session,
    };

    let result = root::Desk::open(&opts).and_then(|desk| {
        let json = cli.json;
        match cli.command {
            Commands::Prompts { subcommand } => cmd::prompts::run(&desk, subcommand, json),
            Commands::Supplementals { subcommand } => {
                cmd::supplementals::run(&desk, subcommand, json)
            }
            Commands::Projects { subcommand } => cmd::projects::run(&desk, subcommand, json),
            Commands::Project { subcommand } => cmd::project::run(&desk, subcommand, json),
            Commands::Settings { subcommand } => cmd::settings::run(&desk, subcommand, json),
            Commands::Select(args) => cmd::select::run(&desk, args, json),
            Commands::Selection { subcommand } => cmd::selection::run(&desk, subcommand, json),
            Commands::Generate(args) => cmd::generate::run(&desk, args, json),
            Commands::Critique(args) => cmd::critique::run(&desk, args, json),
            Commands::Plan { subcommand } => cmd::plan::run(&desk, subcommand, json),
            Commands::Refine(args) => cmd::refine::run(&desk, args, json),
            Commands::Session { subcommand } => cmd::session::run(&desk, subcommand, json),
            Commands::Config { subcommand } => cmd::config::run(&desk, subcommand, json),
        }
    });

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
