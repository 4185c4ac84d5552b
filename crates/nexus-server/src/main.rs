use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

use nexus_core::NexusConfig;
use nexus_graph::{GraphClient, GraphConfig};
use nexus_server::{layers, router, AppState};

#[derive(Parser)]
#[command(name = "nexus-server")]
#[command(about = "Authenticated HTTP API over a Neo4j graph")]
#[command(version)]
struct Cli {
    /// Config file name without extension; missing files are skipped.
    #[arg(short, long, default_value = "nexus")]
    config: String,

    /// Listen address, overriding server.bind.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).json().init();

    let cli = Cli::parse();
    let config = NexusConfig::load(&cli.config)?;
    let labels = config.schema.allow_list()?;

    let graph = GraphClient::connect(&GraphConfig::from(&config.neo4j))
        .await
        .context("connecting to Neo4j")?;
    graph.ping().await.context("Neo4j did not answer ping")?;

    if config.schema.enforce_unique_ids {
        graph.ensure_constraints(labels.labels()).await?;
    }

    let state = AppState::new(Arc::new(graph), &config.auth.token, labels);
    let app = router(state).layer(layers::cors(&config.server.cors_origins)?);

    let bind = cli.bind.unwrap_or(config.server.bind);
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address {bind:?}"))?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Nexus API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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
    tracing::info!("Shutdown signal received");
}
