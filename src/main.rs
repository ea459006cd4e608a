mod config;
mod models;
mod plugin;
mod routes;
mod services;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::services::{
    live_tv::{BackendFactory, TunerLiveTvService},
    refresh::{start_refresh_task, RefreshConfig},
    settings::{ConfigStore, FileConfigStore},
    trailers::{TrailerChannel, TrailerListingDownloader},
};

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn ConfigStore>,
    pub live_tv: Arc<TunerLiveTvService>,
    pub trailers: TrailerChannel,
    pub start_time: Instant,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tvtrailers_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration
    let config = Config::from_env();
    let port = config.port;

    tracing::info!("Starting TV & Trailers Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app_env);

    // Plugin settings store
    let store: Arc<dyn ConfigStore> = Arc::new(FileConfigStore::new(&config.plugin_config_path));
    tracing::info!("Plugin settings: {}", config.plugin_config_path);

    // One HTTP client shared by every outbound call
    let http = config.http_settings().build_client()?;

    // Live TV backend, loaded with the current settings
    let factory = BackendFactory::new(http.clone(), &config.guide_api_url);
    let live_tv = TunerLiveTvService::start(store.clone(), factory).await;
    tracing::info!("Live TV service initialized (guide API: {})", config.guide_api_url);

    // Trailer channel
    let trailers = TrailerChannel::new(
        TrailerListingDownloader::new(http, &config.trailer_catalog_url),
        store.clone(),
    );
    tracing::info!("Trailer channel initialized (catalog: {})", config.trailer_catalog_url);

    // Start settings refresh task (runs in background)
    let shutdown = CancellationToken::new();
    let refresh_task = tokio::spawn(start_refresh_task(
        live_tv.clone(),
        RefreshConfig {
            interval: Duration::from_millis(config.refresh_interval_ms),
        },
        shutdown.clone(),
    ));

    // Build application state
    let state = Arc::new(AppState {
        config,
        store,
        live_tv,
        trailers,
        start_time: Instant::now(),
    });

    // Build router
    let app = routes::router(state)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    // Stop the refresh loop before exiting
    shutdown.cancel();
    refresh_task.await?;
    tracing::info!("Server stopped");

    Ok(())
}

/// Resolves on Ctrl+C and cancels background tasks
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
    shutdown.cancel();
}
