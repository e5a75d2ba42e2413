//! Prometheus exporter for HiveOS rig status.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info};

use hive_common::{StatusReader, init_tracing};
use hive_exporter_prometheus::{ExporterConfig, HttpServer, MetricRegistry, StatusPoller};

/// Prometheus exporter for HiveOS rig status.
#[derive(Parser, Debug)]
#[command(name = "hive-exporter-prometheus")]
#[command(about = "Export HiveOS rig status as Prometheus metrics")]
#[command(version)]
struct Args {
    /// Path to configuration file (JSON5 format).
    #[arg(short, long)]
    config: Option<String>,

    /// HTTP listen address (overrides config).
    #[arg(long)]
    listen: Option<String>,

    /// Status document path (overrides config).
    #[arg(long)]
    status_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error; overrides config).
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        ExporterConfig::load_from_file(config_path)?
    } else {
        ExporterConfig::default()
    };

    // Override from CLI
    if let Some(listen) = args.listen {
        config.prometheus.listen = listen;
    }
    if let Some(status_file) = args.status_file {
        config.source.path = status_file;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    config.validate()?;

    init_tracing(&config.logging)?;

    info!("Starting HiveOS Prometheus Exporter");

    // Create shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let registry = Arc::new(MetricRegistry::new(&config.prometheus.prefix));

    // Parse listen address
    let listen_addr: SocketAddr = config
        .prometheus
        .listen
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address: {}", e))?;

    // Create components
    let poller = StatusPoller::new(
        StatusReader::new(&config.source.path),
        registry.clone(),
        config.source.poll_interval(),
    );
    let http_server = HttpServer::new(
        registry.clone(),
        listen_addr,
        config.prometheus.path.clone(),
    );

    // Start poller
    let poller_task = tokio::spawn(poller.run(shutdown_rx.clone()));

    // Start HTTP server
    let http_shutdown = shutdown_rx.clone();
    let http_task = tokio::spawn(async move {
        if let Err(e) = http_server.run(http_shutdown).await {
            error!("HTTP server error: {}", e);
        }
    });

    wait_for_signal().await;

    // Signal shutdown
    shutdown_tx.send(true)?;

    // Wait for tasks to complete
    let _ = tokio::time::timeout(Duration::from_secs(5), async {
        let _ = poller_task.await;
        let _ = http_task.await;
    })
    .await;

    // Print final stats
    let stats = registry.stats();
    info!(
        polls = stats.polls,
        published = stats.published,
        not_found = stats.not_found,
        read_failures = stats.read_failures,
        decode_errors = stats.decode_errors,
        "Final statistics"
    );

    info!("Exporter stopped");
    Ok(())
}

/// Wait for Ctrl+C or, on unix, SIGTERM.
async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        info!("Received Ctrl+C, shutting down...");
                    }
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, shutting down...");
                    }
                }
                return;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
            }
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down..."),
        Err(e) => {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}
