//! jlink-online - minimized Java runtimes on demand
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use jlink_online::cli::{Cli, Commands};
use jlink_online::config::ConfigManager;
use jlink_online::error::JlinkResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> JlinkResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };
    let mut config = config_manager.load().await?;
    config.apply_env_overrides()?;

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug; RUST_LOG wins
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 if matches!(cli.command, Commands::Serve(_)) => EnvFilter::new("jlink_online=info"),
        0 => EnvFilter::new("jlink_online=warn"),
        1 => EnvFilter::new("jlink_online=info"),
        _ => EnvFilter::new("jlink_online=debug"),
    });

    if config.general.log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
    debug!("Configuration loaded from {}", config_manager.path().display());

    // Dispatch to command
    match cli.command {
        Commands::Serve(args) => jlink_online::cli::commands::serve(args, &config).await,
        Commands::Build(args) => jlink_online::cli::commands::build(args, &config).await,
        Commands::Releases(args) => jlink_online::cli::commands::releases(args, &config).await,
        Commands::Cache(args) => jlink_online::cli::commands::cache(args, &config).await,
        Commands::Config(args) => {
            jlink_online::cli::commands::config(args, &config_manager, &config).await
        }
    }
}
