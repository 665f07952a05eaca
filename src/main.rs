mod cli;
mod commands;

use clap::Parser;
use cli::Cli;
use openwith::config::Config;
use openwith::observability;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    observability::init_tracing(&config.logging.filter);

    commands::run(cli.command, config).await
}
