use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use openflights::LoadOptions;
use openflights_api::{config::ApiConfig, startup::Application};
use openflights_config::load_config;
use openflights_config::shared::DatabaseConfig;
use openflights_telemetry::tracing::init_tracing;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "OpenFlights reference data API", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Apply pending database migrations
    Migrate,
    /// Bulk load the OpenFlights CSV dataset
    Load {
        /// Directory holding countries.csv, planes.csv, airports.csv and airlines.csv
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Delete every airport, airline, plane and country before loading
        #[arg(long, default_value = "false")]
        clear: bool,
    },
    /// Create or refresh the configured administrator account
    EnsureAdmin,
}

/// Entry point for the OpenFlights API service.
fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let _log_flusher = init_tracing(env!("CARGO_BIN_NAME"))?;

    actix_web::rt::System::new().block_on(async_main(args))?;

    Ok(())
}

async fn async_main(args: Args) -> anyhow::Result<()> {
    let config =
        load_config::<ApiConfig>().context("loading API configuration from `configuration/`")?;
    log_database_config(&config.database);

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!(
                host = config.application.host,
                port = config.application.port,
                "starting server"
            );
            let application = Application::build(config).await?;
            application.run_until_stopped().await?;
        }
        Command::Migrate => {
            Application::migrate_database(&config.database).await?;
            info!("database migrated successfully");
        }
        Command::Load { data_dir, clear } => {
            let mut options = LoadOptions::from_config(&config.loader, clear);
            if let Some(data_dir) = data_dir {
                options.data_dir = data_dir;
            }

            let summary = Application::load_dataset(&config.database, &options)
                .await
                .with_context(|| format!("loading dataset from `{}`", options.data_dir.display()))?;
            info!(counts = %summary.counts, "dataset loaded");
        }
        Command::EnsureAdmin => {
            let provisioning = Application::ensure_admin(&config)
                .await
                .context("provisioning the admin account")?;
            info!(?provisioning, "admin provisioning finished");
        }
    }

    Ok(())
}

fn log_database_config(config: &DatabaseConfig) {
    info!(
        path = config.path,
        max_connections = config.max_connections,
        create_if_missing = config.create_if_missing,
        "sqlite database options",
    );
}
