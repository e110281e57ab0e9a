use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod configuration;
mod error;

use configuration::Settings;

/// Delegate requests to a team of tool-using assistants
#[derive(Parser)]
#[command(name = "foreman", author, version, about, long_about = None)]
struct Cli {
    /// Configuration file, `foreman.toml` in the working directory by default
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Book flights and hotels through the travel assistants
    Travel {
        /// What to book; a Beijing to Shanghai trip when omitted
        query: Option<String>,
    },

    /// Answer a request with the workers from the configuration file
    ///
    /// Each worker gets the tools of the providers listed in its
    /// `mcp_servers`. A provider that cannot be reached leaves its tools
    /// out instead of failing the run.
    Run {
        query: String,
    },

    /// List the tools announced by every configured provider
    Tools,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let settings = Settings::new(cli.config.as_deref())?;

    match cli.command {
        Command::Travel { query } => commands::travel::execute(settings, query).await,
        Command::Run { query } => commands::run::execute(settings, query).await,
        Command::Tools => commands::tools::execute(settings).await,
    }
}
