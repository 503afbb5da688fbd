//! poolgated — the poolgate daemon.
//!
//! Wires the activation core together: loads the pool descriptor from a
//! TOML file, connects to the orchestrator, and serves the verdict
//! endpoint the gateway's filter calls per request.
//!
//! # Usage
//!
//! ```text
//! poolgated --pool-file pool.toml --port 9002
//! ```

mod pool_file;
mod server;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::info;

use poolgate_activator::{Activator, ActivatorDefaults};
use poolgate_datastore::Datastore;
use poolgate_director::Director;
use poolgate_orchestrator::{KubeScaleClient, OrchestratorClient};

#[derive(Parser)]
#[command(name = "poolgated", about = "Scale-from-zero activator for an inference pool")]
struct Cli {
    /// Port the verdict endpoint listens on.
    #[arg(long, default_value = "9002")]
    port: u16,

    /// TOML file describing the inference pool (name, namespace, annotations).
    #[arg(long)]
    pool_file: PathBuf,

    /// Hold between observed readiness and releasing the request, in seconds.
    #[arg(long, default_value = "5")]
    request_retention_secs: u64,

    /// Default readiness wait after a 0→1 scale-up, in seconds
    /// (overridable per pool via annotation).
    #[arg(long, default_value = "60")]
    scale_from_zero_grace_secs: u64,

    /// Default bound on the post-scale-down drain wait, in seconds
    /// (overridable per pool via annotation).
    #[arg(long, default_value = "60")]
    scale_to_zero_grace_secs: u64,

    /// Default idleness required before scaling back to zero, in seconds
    /// (overridable per pool via annotation).
    #[arg(long, default_value = "300")]
    scale_down_delay_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,poolgate=debug,poolgated=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let pool = pool_file::load_pool(&cli.pool_file)?;
    info!(pool = %pool.id(), path = ?cli.pool_file, "pool descriptor loaded");

    let datastore = Arc::new(Datastore::new());
    datastore.pool_set(pool).await;

    let kube_client = kube::Client::try_default().await?;
    let orchestrator: Arc<dyn OrchestratorClient> = Arc::new(KubeScaleClient::new(kube_client));
    info!("orchestrator client initialized");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let defaults = ActivatorDefaults {
        scale_from_zero_grace_period: Duration::from_secs(cli.scale_from_zero_grace_secs),
        scale_to_zero_grace_period: Duration::from_secs(cli.scale_to_zero_grace_secs),
        scale_down_delay: Duration::from_secs(cli.scale_down_delay_secs),
        request_retention_period: Duration::from_secs(cli.request_retention_secs),
    };
    let activator =
        Arc::new(Activator::new(orchestrator, datastore.clone(), shutdown_rx).with_defaults(defaults));
    let director = Arc::new(Director::new(datastore, activator));
    info!("activation core initialized");

    let router = server::build_router(director);
    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    info!(%addr, "verdict endpoint starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install CTRL+C handler");
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        })
        .await?;

    info!("poolgated stopped");
    Ok(())
}
