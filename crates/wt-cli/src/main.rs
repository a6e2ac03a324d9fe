use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use wt_core::SystemClock;
use wt_store::SqliteStore;
use wt_tracker::Coordinator;

use wt_cli::commands::{clear, replay, report, status, toggle};
use wt_cli::{Cli, Commands, Config};

/// Load config and open the store, ensuring the parent directory exists.
fn open_store(config_path: Option<&Path>) -> Result<(SqliteStore, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let store = SqliteStore::open(&config.database_path).with_context(|| {
        format!("failed to open {}", config.database_path.display())
    })?;
    Ok((store, config))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // try_init: tests may have installed a subscriber already
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (store, config) = open_store(cli.config.as_deref())?;
    let mut stdout = std::io::stdout().lock();

    let coordinator = || Coordinator::new(store.clone(), SystemClock, config.tracker.clone());

    match command {
        Commands::Status => {
            let timezone = iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string());
            status::run(
                &mut stdout,
                &coordinator(),
                &config.database_path,
                &timezone,
                Utc::now(),
            )
            .await?;
        }
        Commands::Report { today, json, min } => {
            report::run(
                &mut stdout,
                &mut coordinator(),
                *today,
                *json,
                *min,
                Utc::now(),
            )
            .await?;
        }
        Commands::Clear => clear::run(&mut stdout, &mut coordinator()).await?,
        Commands::Toggle { state } => {
            toggle::run(&mut stdout, &mut coordinator(), state.enabled()).await?;
        }
        Commands::Replay { path } => {
            replay::run(&mut stdout, store.clone(), config.tracker.clone(), path).await?;
        }
    }

    Ok(())
}
