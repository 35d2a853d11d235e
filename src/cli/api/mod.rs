//! API command - runs API server only (no browser page)

use tokio::net::TcpListener;
use tracing::info;

use super::common::{init_observability, load_config, shutdown_signal, socket_addr};
use crate::api::create_router_with_metrics;
use crate::infrastructure::observability::{init_metrics, shutdown_tracing};

/// Run the API-only server
pub async fn run() -> anyhow::Result<()> {
    let config = load_config()?;
    init_observability(&config);

    let state = crate::create_app_state(&config)?;
    let metrics = init_metrics(&config.observability.metrics);
    let app = create_router_with_metrics(state, metrics);

    let addr = socket_addr(&config, None)?;
    info!("Starting API server on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown_tracing();
    info!("API server shutdown complete");

    Ok(())
}
