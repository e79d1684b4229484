//! catalog-jamendo - Jamendo track ingestion
//!
//! Pages through the Jamendo tracks API and stores every track carrying a
//! usable Creative Commons license in the catalog database.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use catalog_common::config::{resolve_root_folder, TomlConfig, DATABASE_FILE};
use catalog_common::db::{init_database, SqliteAudioStore};
use catalog_common::requester::DelayedRequester;
use catalog_common::sink::LoggingAudioSink;
use catalog_common::AudioSink;
use catalog_jamendo::{JamendoConfig, JamendoIngester, PROVIDER};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for catalog-jamendo
#[derive(Parser, Debug)]
#[command(name = "catalog-jamendo")]
#[command(about = "Ingest Creative Commons tracks from Jamendo")]
#[command(version)]
struct Args {
    /// Path to catalog.toml (default: <config_dir>/catalog/catalog.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Root folder holding catalog.db
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Jamendo API client id
    #[arg(long)]
    client_id: Option<String>,

    /// Stop after this many pages
    #[arg(long)]
    max_pages: Option<u32>,

    /// Log records instead of writing them to the database
    #[arg(long)]
    dry_run: bool,

    /// Store landing, artist and album URLs as given instead of following
    /// their redirects
    #[arg(long)]
    no_url_cleansing: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = TomlConfig::load(args.config.as_deref()).context("Failed to load config")?;

    let default_filter = args
        .log_level
        .clone()
        .unwrap_or_else(|| toml_config.logging.level.clone());
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting catalog-jamendo");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    match &toml_config.loaded_from {
        Some(path) => info!("Loaded config file: {}", path.display()),
        None => warn!("No config file found, using defaults"),
    }

    let config = JamendoConfig::resolve(args.client_id.as_deref(), args.max_pages, &toml_config)?;
    let requester = Arc::new(
        DelayedRequester::new(config.requester.clone())
            .context("Failed to build HTTP client")?,
    );

    let sink: Arc<dyn AudioSink> = if args.dry_run {
        info!("Dry run: records are logged, not stored");
        Arc::new(LoggingAudioSink)
    } else {
        let root_folder = resolve_root_folder(args.root_folder.as_deref(), &toml_config);
        let db_path = root_folder.join(DATABASE_FILE);
        info!("Database: {}", db_path.display());

        let pool = init_database(&db_path)
            .await
            .context("Failed to open database")?;
        Arc::new(SqliteAudioStore::new(pool, PROVIDER))
    };

    let mut ingester = JamendoIngester::new(&config, requester.clone(), sink);
    if !args.no_url_cleansing {
        ingester = ingester.with_url_resolver(requester);
    }
    let total = ingester
        .run_ingestion()
        .await
        .context("Jamendo ingestion failed")?;

    info!(total, "Stored {} Jamendo tracks", total);
    Ok(())
}
