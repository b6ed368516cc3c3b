//! discography-regional - Regional reference-data synchronization service
//!
//! Pulls the current regional list from the external system of record,
//! reconciles it against the local database, and exposes an administrative
//! HTTP trigger. Optionally runs the sync on a fixed schedule.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use discography_common::api::auth::load_admin_secret;
use discography_common::config::{RootFolderInitializer, TomlConfig};
use discography_common::db::init_database;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use discography_regional::config::{Args, RegionalConfig};
use discography_regional::scheduler::spawn_scheduler;
use discography_regional::source::HttpRegionalSource;
use discography_regional::store::SqliteRegionalStore;
use discography_regional::{build_router, AppState, RegionalSyncService};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (toml_config, rejected_config) = match &args.config {
        Some(path) => (
            TomlConfig::load(path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?,
            None,
        ),
        None => TomlConfig::load_or_default(),
    };
    let config = RegionalConfig::resolve(&args, &toml_config)?;

    // RUST_LOG wins over the configured level
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    info!(
        "Starting Discography Regional Sync (discography-regional) v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Config is read before the subscriber exists
    if let Some(rejected) = &rejected_config {
        warn!("{}", rejected);
    }

    let initializer = RootFolderInitializer::new(config.root_folder.clone());
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;
    info!("✓ Connected to database");

    let admin_secret = match config.admin_secret {
        Some(secret) => secret,
        None => load_admin_secret(&pool)
            .await
            .context("Failed to load admin secret")?,
    };
    if admin_secret == 0 {
        info!("API authentication disabled (admin_secret = 0)");
    } else {
        info!("✓ Loaded admin secret for API authentication");
    }

    let source = HttpRegionalSource::new(&config.regional_api_url)
        .context("Failed to build regional API client")?;
    info!("Regional source: {}", source.endpoint());

    let store = SqliteRegionalStore::new(pool.clone());
    let sync_service = Arc::new(RegionalSyncService::new(
        Arc::new(source),
        Arc::new(store.clone()),
    ));

    let shutdown = CancellationToken::new();
    let scheduler = spawn_scheduler(sync_service.clone(), config.sync_interval, shutdown.clone());

    let state = AppState::new(sync_service, store, admin_secret);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;
    info!("discography-regional listening on http://{}", config.bind_address);
    info!("Health check: http://{}/health", config.bind_address);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    shutdown.cancel();
    if let Some(handle) = scheduler {
        let _ = handle.await;
    }
    pool.close().await;

    info!("discography-regional stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
