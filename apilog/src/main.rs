//! apilog Server Entry Point

use apilog::cli::{Cli, Commands};
use apilog::config::AppConfig;
use apilog::{bootstrap, logging, server};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init()?;

    let mut config = AppConfig::from_env();
    if let Some(Commands::Serve(args)) = &cli.command {
        args.apply(&mut config.server);
    }
    let bind_addr = config.server.bind_addr();

    let state = bootstrap::initialize(config).await?;
    server::run(state, &bind_addr).await
}
