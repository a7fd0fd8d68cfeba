//! Cost Analyzer - cloud resource optimization daemon
//!
//! Periodically analyzes an inventory snapshot and serves the
//! resulting recommendations over HTTP.

use anyhow::Result;
use engine_lib::{
    health::{components, HealthRegistry},
    notify::{JsonFileSink, LogSink, ReportSink},
    observability::{EngineMetrics, StructuredLogger},
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;
mod runner;

const ANALYZER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting cost-analyzer");

    // Load configuration
    let config = config::AnalyzerConfig::load()?;
    info!(
        snapshot_path = %config.snapshot_path,
        interval_secs = config.analysis_interval_secs,
        "Analyzer configured"
    );

    // Initialize health registry
    let health_registry = HealthRegistry::new();
    health_registry.register(components::INVENTORY).await;
    health_registry.register(components::ENGINE).await;
    health_registry.register(components::NOTIFIER).await;

    // Initialize metrics
    let metrics = EngineMetrics::new();

    // Initialize structured logger
    let logger = StructuredLogger::new("cost-analyzer");
    logger.log_startup(ANALYZER_VERSION);

    // Create shared application state
    let app_state = Arc::new(api::AppState::new(health_registry.clone(), metrics.clone()));

    // Report sinks: structured log line plus the JSON report file
    let sinks: Vec<Box<dyn ReportSink>> = vec![
        Box::new(LogSink),
        Box::new(JsonFileSink::new(&config.report_path)),
    ];

    // Start the analysis loop
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let api_port = config.api_port;
    let analysis = runner::Runner::new(config, Arc::clone(&app_state), logger.clone(), sinks)?;
    let runner_handle = tokio::spawn(analysis.run(shutdown_rx));

    // Start health and metrics server
    let _api_handle = tokio::spawn(api::serve(api_port, app_state));

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    logger.log_shutdown("SIGINT received");
    let _ = shutdown_tx.send(true);
    let _ = runner_handle.await;
    info!("Shutting down");

    Ok(())
}
