//! API layer - HTTP endpoints and middleware

pub mod health;
pub mod keys;
pub mod middleware;
pub mod router;
pub mod state;
pub mod types;

pub use middleware::RequireSession;
pub use router::{
    create_api_routes, create_router_with_metrics, create_router_with_state, with_middleware,
};
pub use state::AppState;
