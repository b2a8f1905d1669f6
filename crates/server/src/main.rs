use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use splice_core::{
    load_config, validate_config, DownloadManager, FfmpegRemuxer, HttpRetriever,
    InMemoryJobStore, JobStore, MergeOrchestrator, Remuxer, Retriever,
};
use splice_server::{api::create_router, state::AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
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

    info!("splice {} starting", VERSION);

    // Determine config path
    let config_path = std::env::var("SPLICE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Downloads directory: {:?}", config.downloads.dir);
    info!("Max concurrent jobs: {}", config.downloads.max_concurrent_jobs);

    tokio::fs::create_dir_all(&config.downloads.dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create downloads directory {:?}",
                config.downloads.dir
            )
        })?;

    // Create retriever
    let retriever: Arc<dyn Retriever> = Arc::new(
        HttpRetriever::new(config.http.clone()).context("Failed to create HTTP retriever")?,
    );
    info!("Using retriever: {}", retriever.name());

    // Create remuxer; a missing ffmpeg only fails the merge step, so keep serving
    let remuxer: Arc<dyn Remuxer> = Arc::new(FfmpegRemuxer::new(config.remuxer.clone()));
    match remuxer.validate().await {
        Ok(()) => info!("Using remuxer: {}", remuxer.name()),
        Err(e) => warn!("ffmpeg is not usable, merges will fail: {}", e),
    }

    // Create job registry and manager
    let job_store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new());
    let manager = DownloadManager::new(
        MergeOrchestrator::new(retriever, remuxer),
        job_store,
        config.downloads.clone(),
    );

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), manager));

    // Create router
    let app = create_router(Arc::clone(&state));

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

    let running = state.manager().running_jobs();
    if running > 0 {
        warn!("Shutting down with {} merge(s) still running", running);
    }
    info!("Server shutting down...");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
