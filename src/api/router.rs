use axum::{extract::DefaultBodyLimit, middleware, routing::get, Router};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::health;
use super::keys;
use super::middleware::{
    logging_middleware, metrics_middleware, security_headers_middleware, MAX_BODY_SIZE,
};
use super::state::AppState;
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

/// Key routes plus probes, without middleware
///
/// Key routes are served at `/keys/*` and again at `/api/keys/*`, the paths
/// the browser page calls.
pub fn create_api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .nest("/keys", keys::create_keys_router())
        .nest("/api/keys", keys::create_keys_router())
}

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    with_middleware(create_api_routes().with_state(state))
}

/// Full router with the Prometheus endpoint merged in when metrics are enabled
pub fn create_router_with_metrics(state: AppState, metrics: Option<PrometheusMetrics>) -> Router {
    let router = create_api_routes().with_state(state);

    let router = match metrics {
        Some(metrics) => router.merge(create_metrics_router(metrics)),
        None => router,
    };

    with_middleware(router)
}

/// Request logging, metrics, security headers and tracing for a stateless router
///
/// Requests without an `x-request-id` get a UUID before logging sees them; the
/// id is echoed on the response.
pub fn with_middleware(router: Router) -> Router {
    router
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
