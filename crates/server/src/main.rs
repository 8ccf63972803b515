use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use faceswap_core::{
    config::LoggingConfig, load_config, load_config_from_env, validate_config, Config,
    FaceFusionRunner, Fetcher, HttpFetcher, LogFormat, Publisher, S3Publisher, SwapOrchestrator,
    ToolRunner,
};
use faceswap_server::api::create_router;
use faceswap_server::state::AppState;

/// Config file used when `FACESWAP_CONFIG` is unset
const DEFAULT_CONFIG_PATH: &str = "faceswap.toml";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        // Logging may not be initialized yet when config loading fails
        eprintln!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = load()?;
    init_tracing(&config.logging);

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!(
        bucket = %config.storage.bucket,
        region = %config.storage.region,
        max_concurrent = config.jobs.max_concurrent,
        "Storage and admission settings"
    );
    if !config.storage.has_credentials() {
        warn!("Storage credentials are not configured, every upload will fail");
    }

    let fetcher: Arc<dyn Fetcher> = Arc::new(
        HttpFetcher::new(config.fetcher.clone()).context("Failed to create HTTP fetcher")?,
    );
    let runner: Arc<dyn ToolRunner> = Arc::new(FaceFusionRunner::new(config.tool.clone()));
    let publisher: Arc<dyn Publisher> = Arc::new(S3Publisher::new(config.storage.clone()));

    let orchestrator = Arc::new(SwapOrchestrator::new(
        config.jobs.clone(),
        config.tool.clone(),
        config.workspace.clone(),
        config.target_pool.clone(),
        fetcher,
        runner,
        publisher,
    ));

    // The tool is only needed per request, so a broken install is not fatal
    match orchestrator.validate_tool().await {
        Ok(()) => info!("Face swap tool is available"),
        Err(e) => warn!(error = %e, "Face swap tool validation failed"),
    }

    let addr = SocketAddr::new(config.server.host, config.server.port);

    // Create app state and router
    let state = Arc::new(AppState::new(config, orchestrator));
    let app = create_router(state);

    // Start server
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Load configuration from `FACESWAP_CONFIG`, `faceswap.toml`, or the environment alone.
fn load() -> Result<Config> {
    match std::env::var_os("FACESWAP_CONFIG").map(PathBuf::from) {
        Some(path) => load_config(&path)
            .with_context(|| format!("Failed to load config from {:?}", path)),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            load_config(Path::new(DEFAULT_CONFIG_PATH))
                .with_context(|| format!("Failed to load config from {}", DEFAULT_CONFIG_PATH))
        }
        None => load_config_from_env().context("Failed to load config from environment"),
    }
}

/// Initialize logging. `RUST_LOG` takes precedence over the configured filter.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let registry = tracing_subscriber::registry().with(filter);

    match logging.format {
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received");
}
