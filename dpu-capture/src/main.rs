//! dpu-capture - Outlet photo-capture kiosk service
//!
//! Serves the capture wizard over HTTP + SSE, reads frames from the
//! configured camera source and forwards finished reports to the
//! reporting web app.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dpu_common::config::{CliOverrides, ConfigResolver};
use dpu_common::events::EventBus;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dpu_capture::camera::{DirectoryCamera, JpegFrameEncoder};
use dpu_capture::outlets::OutletCatalogue;
use dpu_capture::submitter::HttpReportSubmitter;
use dpu_capture::AppState;

/// Command-line arguments for dpu-capture
#[derive(Parser, Debug)]
#[command(name = "dpu-capture")]
#[command(about = "Guided outlet photo-capture service")]
#[command(version)]
struct Args {
    /// TOML configuration file (also DPU_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:5740
    #[arg(short, long)]
    bind: Option<String>,

    /// Directory of still frames used as the camera
    #[arg(long)]
    camera_source: Option<PathBuf>,

    /// Reporting web app URL
    #[arg(long)]
    endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut resolver = ConfigResolver::new(CliOverrides {
        endpoint_url: args.endpoint,
        camera_source: args.camera_source,
        bind_address: args.bind,
    });
    if let Some(path) = args.config {
        resolver = resolver.with_config_path(path);
    }
    let config = resolver
        .resolve()
        .context("Failed to resolve configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting dpu-capture v{}", env!("CARGO_PKG_VERSION"));
    info!("Camera source: {}", config.camera_source.display());
    if !config.has_configured_endpoint() {
        warn!("Reporting endpoint is not configured; submissions will fail until it is set");
    }

    let catalogue = OutletCatalogue::from_config(&config);
    info!("Outlet catalogue: {} codes", catalogue.len());

    let submitter = HttpReportSubmitter::from_config(&config)
        .context("Failed to build HTTP client")?;

    let event_bus = EventBus::new(100);

    let state = AppState::new(
        catalogue,
        Arc::new(DirectoryCamera::new(config.camera_source.clone())),
        Arc::new(JpegFrameEncoder::default()),
        Arc::new(submitter),
        event_bus,
    )
    .with_backend_configured(config.has_configured_endpoint());

    let app = dpu_capture::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_address))?;
    info!("Listening on http://{}", config.bind_address);
    info!("Health check: http://{}/health", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
