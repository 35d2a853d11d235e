//! Serve command - runs API + browser page on the same port

use std::path::PathBuf;

use axum::response::Redirect;
use axum::routing::get;
use axum::Router;
use clap::Args;
use tokio::net::TcpListener;
use tower_http::services::{ServeDir, ServeFile};
use tracing::info;

use super::common::{init_observability, load_config, shutdown_signal, socket_addr};
use crate::api::state::AppState;
use crate::api::{create_api_routes, with_middleware};
use crate::infrastructure::observability::{
    create_metrics_router, init_metrics, shutdown_tracing, PrometheusMetrics,
};

/// Arguments for the serve command
#[derive(Args, Clone)]
pub struct ServeArgs {
    /// Directory holding the browser page
    #[arg(long, default_value = DEFAULT_PUBLIC_DIR)]
    pub public_dir: PathBuf,
}

const DEFAULT_PUBLIC_DIR: &str = "public";

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            public_dir: PathBuf::from(DEFAULT_PUBLIC_DIR),
        }
    }
}

/// Run the combined API + browser page server
pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    let config = load_config()?;
    init_observability(&config);

    let state = crate::create_app_state(&config)?;
    let metrics = init_metrics(&config.observability.metrics);
    let app = create_router_with_ui(state, metrics, &args.public_dir);

    let addr = socket_addr(&config, None)?;
    info!("Starting server (API + UI) on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown_tracing();
    info!("Server shutdown complete");

    Ok(())
}

/// Router with the key API, the page under `/ui`, and `/` redirecting to it
fn create_router_with_ui(
    state: AppState,
    metrics: Option<PrometheusMetrics>,
    public_dir: &std::path::Path,
) -> Router {
    let page = ServeDir::new(public_dir).fallback(ServeFile::new(public_dir.join("index.html")));

    let router = create_api_routes()
        .nest_service("/ui", page)
        .route("/", get(|| async { Redirect::permanent("/ui/") }))
        .with_state(state);

    let router = match metrics {
        Some(metrics) => router.merge(create_metrics_router(metrics)),
        None => router,
    };

    with_middleware(router)
}
