use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use url::Url;

mod commands;
mod config;
mod host;

use config::ConfigLoader;

#[derive(Parser)]
#[command(name = "traceback", about = "Simulate deferred deep link attribution")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file layered over user and project config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Main associated host, overriding any config file
    #[arg(long, global = true)]
    host: Option<Url>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the post-install search
    Search(commands::search::SearchArgs),
    /// Handle a link as if the app was opened with it
    Open(commands::open::OpenArgs),
    /// Check whether a link belongs to the configured hosts
    Check(commands::check::CheckArgs),
    /// Check the configuration for common mistakes
    Diagnose(commands::diagnose::DiagnoseArgs),
    /// Show or reset the persisted attribution state
    State(commands::state::StateArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let raw = ConfigLoader::load(cli.config.as_deref())?;

    let filter = if cli.verbose {
        "debug"
    } else {
        raw.traceback.log_level.unwrap_or_default().as_filter()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ConfigLoader::finalize(raw, cli.host)?;

    match cli.command {
        Commands::Search(args) => commands::search::run(args, &config).await,
        Commands::Open(args) => commands::open::run(args, &config).await,
        Commands::Check(args) => commands::check::run(args, &config),
        Commands::Diagnose(args) => commands::diagnose::run(args, &config),
        Commands::State(args) => commands::state::run(args, &config).await,
    }
}
