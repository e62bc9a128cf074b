use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use batchdl_core::{
    load_config, validate_config, Archiver, BatchOrchestrator, Config, ConfigError, Fetcher,
    HttpFetcher, ZipArchiver,
};

use batchdl_server::api::create_router;
use batchdl_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("BATCHDL_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration; a missing file means built-in defaults
    let config = match load_config(&config_path) {
        Ok(config) => {
            info!("Loaded configuration from {:?}", config_path);
            config
        }
        Err(ConfigError::FileNotFound(_)) => {
            warn!("No config file at {:?}, using defaults", config_path);
            Config::default()
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to load config from {:?}", config_path))
        }
    };

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Download root: {:?}", config.storage.download_root);
    info!(
        "Worker pool: {} (max {})",
        config.pool.default_workers, config.pool.max_workers
    );

    // Prepare storage roots
    tokio::fs::create_dir_all(&config.storage.download_root)
        .await
        .context("Failed to create download root")?;
    tokio::fs::create_dir_all(&config.storage.upload_root)
        .await
        .context("Failed to create upload root")?;

    // Create collaborators
    let fetcher: Arc<dyn Fetcher> = Arc::new(
        HttpFetcher::new(config.fetcher.clone()).context("Failed to create HTTP fetcher")?,
    );
    let archiver: Arc<dyn Archiver> = Arc::new(ZipArchiver::default());
    info!("Using fetcher '{}', archiver '{}'", fetcher.name(), archiver.name());

    // Create orchestrator
    let orchestrator = Arc::new(BatchOrchestrator::new(
        config.pool.clone(),
        config.storage.download_root.clone(),
        fetcher,
        archiver,
    ));

    // Create app state and router
    let state = Arc::new(AppState::new(config.clone(), Arc::clone(&orchestrator)));
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    orchestrator.shutdown().await;

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
