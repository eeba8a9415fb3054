use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::Parser;
use tabletalk_core::config::settings::DEFAULT_CONFIG_FILE;
use tabletalk_core::config::Settings;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod output;

#[derive(Parser)]
#[command(
    name = "tabletalk",
    version,
    about = "Ask questions about CSV data and export the answers as a report"
)]
struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: output::OutputFormat,

    /// Directory holding the session between invocations
    #[arg(long, global = true, env = "TABLETALK_STATE_DIR", default_value = ".tabletalk")]
    state_dir: PathBuf,

    /// Settings file (default: ./tabletalk.toml when present)
    #[arg(long, global = true, env = "TABLETALK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: commands::Commands,
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(config: Option<&Path>) -> Result<Settings> {
    // .env only fills variables the environment does not already set
    dotenvy::dotenv().ok();

    let default = Path::new(DEFAULT_CONFIG_FILE);
    let path = config.or_else(|| default.exists().then_some(default));
    Settings::load(path).context("Failed to load settings")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = commands::Context {
        settings: load_settings(cli.config.as_deref())?,
        state_dir: cli.state_dir,
        format: cli.format,
    };

    match &cli.command {
        commands::Commands::Load(args) => commands::load::run(args, &ctx),
        commands::Commands::ClearData => commands::clear_data::run(&ctx),
        commands::Commands::Ask(args) => commands::ask::run(args, &ctx),
        commands::Commands::Chat => commands::chat::run(&ctx),
        commands::Commands::History => commands::history::run(&ctx),
        commands::Commands::ClearHistory => commands::clear_history::run(&ctx),
        commands::Commands::Export(args) => commands::export::run(args, &ctx),
        commands::Commands::Version => commands::version::run(),
    }
}
