//! WireGuard provisioner - Application entry point
//!
//! CLI-based entry point that dispatches to various commands.

use clap::Parser;

use wg_provisioner::{
    cli::{Cli, Commands},
    commands,
    config::Config,
    logging,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = Config::from_env();

    let logging = match logging::init(&config, cli.verbose) {
        Ok(logging) => logging,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    tracing::debug!(?config, "Configuration loaded");

    let result = match cli.command {
        Commands::Serve(args) => commands::serve::execute(args, config).await,
        Commands::Migrate(args) => commands::migrate::execute(args, config).await,
    };

    let failed = match result {
        Ok(()) => false,
        Err(e) => {
            tracing::error!("Command failed: {}", e);
            true
        }
    };

    logging.shutdown();
    if failed {
        std::process::exit(1);
    }
}
