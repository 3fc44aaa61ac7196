//! HTTP API for dashboard logins.

mod handlers;
mod middleware;
mod types;

pub use handlers::*;
pub use middleware::{logging_middleware, rate_limit_middleware, redacted_path, RateLimitState};
pub use types::*;

use axum::{
    http::Request,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use chat_client::ChatClient;
use handshake_store::HandshakeStore;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Pending login table
    pub store: HandshakeStore,
    /// Chat gateway, probed by the health check
    pub chat: Arc<ChatClient>,
}

impl AppState {
    pub fn new(store: HandshakeStore, chat: ChatClient) -> Self {
        Self {
            store,
            chat: Arc::new(chat),
        }
    }
}

/// Create the API router. Only login creation is rate limited; polling
/// a token must always answer.
pub fn create_router_with_rate_limit(state: AppState, rate_limit: RateLimitState) -> Router {
    let limited = Router::new()
        .route("/auth/request", post(handlers::request_auth))
        .layer(axum_middleware::from_fn_with_state(
            rate_limit,
            rate_limit_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/check/:token", get(handlers::check_auth))
        .merge(limited)
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::debug_span!(
                    "request",
                    method = %request.method(),
                    path = %redacted_path(request.uri().path()),
                )
            }),
        )
        // Dashboards are served from arbitrary origins.
        .layer(CorsLayer::permissive())
        .with_state(state)
}
