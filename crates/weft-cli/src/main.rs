#![forbid(unsafe_code)]

mod cmd;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use output::OutputMode;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use weft_core::EngineConfig;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "weft: event-sourced narrative state tracker",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Engine config file (TOML). Defaults to the per-user config.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Project the narrative state at a message",
        after_help = "EXAMPLES:\n    # State at the latest message\n    weft state chat.json\n\n    # State as it was at message 12\n    weft state chat.json --at 12\n\n    # Machine-readable output\n    weft state chat.json --json"
    )]
    State(cmd::state::StateArgs),

    #[command(
        about = "List chapters",
        after_help = "EXAMPLES:\n    weft chapters chat.json\n    weft chapters chat.json --json"
    )]
    Chapters(cmd::chapters::ChaptersArgs),

    #[command(
        about = "List milestones",
        after_help = "EXAMPLES:\n    # Milestones on the selected timeline\n    weft milestones chat.json\n\n    # Across every swipe branch\n    weft milestones chat.json --all-timelines"
    )]
    Milestones(cmd::milestones::MilestonesArgs),

    #[command(
        about = "Export snapshot, chapters, and milestones as one JSON document",
        after_help = "EXAMPLES:\n    weft export chat.json > narrative.json"
    )]
    Export(cmd::export::ExportArgs),

    #[command(
        about = "Validate a transcript and summarize its event log",
        after_help = "EXAMPLES:\n    weft check chat.json"
    )]
    Check(cmd::check::CheckArgs),
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path),
        None => EngineConfig::load_user(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mode = OutputMode::resolve(cli.format, cli.json);
    let cfg = load_config(cli.config.as_ref())?;

    match &cli.command {
        Commands::State(args) => cmd::state::run(args, mode, &cfg),
        Commands::Chapters(args) => cmd::chapters::run(args, mode),
        Commands::Milestones(args) => cmd::milestones::run(args, mode),
        Commands::Export(args) => cmd::export::run(args, &cfg),
        Commands::Check(args) => cmd::check::run(args, mode),
    }
}
