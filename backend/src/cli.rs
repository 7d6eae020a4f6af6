use clap::{Parser, Subcommand};

use crate::batch::{BatchArgs, run_batch_command};
use crate::check::run_check;
use crate::config::Settings;
use crate::error::Result;
use crate::server::{ServeArgs, run_serve};

#[derive(Debug, Parser)]
#[command(
    name = "parkini",
    about = "Smart parking prediction dashboard and model test runner",
    version
)]
pub struct Cli {
    /// Prediction service origin (overrides PARKINI_API_URL).
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Serve the dashboard and its runtime configuration (default).
    Serve(ServeArgs),

    /// Probe the prediction service health and feature lists.
    Check,

    /// Run a test batch against one model and print statistics.
    Batch(BatchArgs),
}

pub async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::from_env()?.with_api_url(cli.api_url)?;
    match cli.command.unwrap_or_else(|| Commands::Serve(ServeArgs::default())) {
        Commands::Serve(args) => run_serve(settings, args).await,
        Commands::Check => run_check(settings).await,
        Commands::Batch(args) => run_batch_command(settings, args).await,
    }
}
