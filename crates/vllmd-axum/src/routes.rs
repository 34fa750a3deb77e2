//! Route definitions and router construction.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Controller API under `/api/vllm`, CORS open to any origin.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/serve", post(handlers::serve::serve))
        .route("/down", post(handlers::serve::down))
        .route("/health", get(handlers::serve::health))
        .route("/hf/health", post(handlers::hf::hub_health))
        .route("/hf/download", post(handlers::hf::hub_download));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/vllm", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
