//! NFS Kubernetes Operator
//!
//! Main entry point for the operator. Sets up the Kubernetes client,
//! starts the metrics server and runs the Nfs reconciliation loop.

use std::sync::Arc;

use anyhow::Context as _;
use kube::Client;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nfs_operator::{
    controllers::{self, Context},
    metrics,
};

/// Default metrics port
const METRICS_PORT: u16 = 8080;

/// Environment variable overriding the metrics port
const METRICS_PORT_ENV: &str = "METRICS_PORT";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    info!("Starting NFS Operator");

    // Create Kubernetes client
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes API server");

    // Create shared context
    let context = Arc::new(Context::new(client));

    // Start metrics server
    let metrics_port = metrics_port()?;
    let metrics_handle = tokio::spawn(metrics::serve(metrics_port));
    info!(port = metrics_port, "Metrics server starting");

    let nfs_controller = controllers::run_nfs_controller(context);

    // Handle graceful shutdown
    tokio::select! {
        _ = nfs_controller => {
            error!("Nfs controller exited unexpectedly");
        }
        _ = metrics_handle => {
            error!("Metrics server exited unexpectedly");
        }
        _ = shutdown_signal() => {
            info!("Received shutdown signal, stopping operator");
        }
    }

    metrics::OPERATOR_HEALTH.set(0.0);
    info!("NFS Operator stopped");
    Ok(())
}

/// Metrics port from the environment, or the default
fn metrics_port() -> anyhow::Result<u16> {
    match std::env::var(METRICS_PORT_ENV) {
        Ok(port) => port
            .parse()
            .with_context(|| format!("invalid {} '{}'", METRICS_PORT_ENV, port)),
        Err(_) => Ok(METRICS_PORT),
    }
}

/// Initialize tracing subscriber
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kube=warn,hyper=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}

/// Wait for SIGINT or SIGTERM
async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        result = signal::ctrl_c() => match result {
            Ok(()) => info!("Received CTRL+C signal"),
            Err(e) => error!(error = %e, "Failed to listen for CTRL+C"),
        },
        _ = terminate => info!("Received SIGTERM signal"),
    }
}
