//! UI command - serves the browser page, proxying `/api/*` to a running API

use std::path::PathBuf;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{any, get};
use axum::Router;
use clap::Args;
use reqwest::Client;
use tokio::net::TcpListener;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{error, info};

use super::common::{init_observability, load_config, shutdown_signal, socket_addr};
use crate::api::middleware::MAX_BODY_SIZE;
use crate::api::with_middleware;

/// Arguments for the UI command
#[derive(Args, Clone)]
pub struct UiArgs {
    /// API URL to proxy `/api/*` requests to
    #[arg(long, default_value = "http://localhost:8080")]
    pub api_url: String,

    /// Skip proxying - serve static files only
    #[arg(long)]
    pub skip_proxy: bool,

    /// Port to serve the page on (overrides config)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory holding the browser page
    #[arg(long, default_value = "public")]
    pub public_dir: PathBuf,
}

/// Run the UI server
pub async fn run(args: UiArgs) -> anyhow::Result<()> {
    let config = load_config()?;
    init_observability(&config);

    let app = with_middleware(create_ui_router(&args));
    let addr = socket_addr(&config, args.port)?;

    if args.skip_proxy {
        info!("Starting UI server on {} (static files only)", addr);
    } else {
        info!(
            "Starting UI server on {} (proxying /api/* to {})",
            addr, args.api_url
        );
    }

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Page under `/ui` with `/` redirecting to it, plus the optional API proxy
fn create_ui_router(args: &UiArgs) -> Router {
    let page = ServeDir::new(&args.public_dir)
        .fallback(ServeFile::new(args.public_dir.join("index.html")));

    let router = Router::new()
        .nest_service("/ui", page)
        .route("/", get(|| async { Redirect::permanent("/ui/") }));

    if args.skip_proxy {
        return router;
    }

    let proxy_state = ProxyState {
        api_url: args.api_url.trim_end_matches('/').to_string(),
        client: Client::new(),
    };

    router.merge(
        Router::new()
            .route("/api/{*path}", any(proxy_handler))
            .with_state(proxy_state),
    )
}

#[derive(Clone)]
struct ProxyState {
    api_url: String,
    client: Client,
}

/// Forward `/api/*` unchanged; the API serves its key routes under `/api` too
async fn proxy_handler(State(state): State<ProxyState>, req: Request<Body>) -> impl IntoResponse {
    let target_url = match req.uri().query() {
        Some(query) => format!("{}{}?{}", state.api_url, req.uri().path(), query),
        None => format!("{}{}", state.api_url, req.uri().path()),
    };

    match forward_request(&state.client, req, &target_url).await {
        Ok(response) => response,
        Err(e) => {
            error!("Proxy error: {}", e);
            (StatusCode::BAD_GATEWAY, format!("Proxy error: {}", e)).into_response()
        }
    }
}

async fn forward_request(
    client: &Client,
    req: Request<Body>,
    target_url: &str,
) -> Result<Response, anyhow::Error> {
    let mut proxy_req = client.request(req.method().clone(), target_url);

    for (key, value) in req.headers() {
        if key != header::HOST && key != header::CONTENT_LENGTH {
            proxy_req = proxy_req.header(key, value);
        }
    }

    let body_bytes = axum::body::to_bytes(req.into_body(), MAX_BODY_SIZE).await?;

    if !body_bytes.is_empty() {
        proxy_req = proxy_req.body(body_bytes);
    }

    let response = proxy_req.send().await?;

    let mut builder = Response::builder().status(response.status());

    for (key, value) in response.headers() {
        if key != header::TRANSFER_ENCODING && key != header::CONTENT_LENGTH {
            builder = builder.header(key, value);
        }
    }

    let body = response.bytes().await?;

    Ok(builder.body(Body::from(body))?)
}
