//! Axum router construction.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the router with every route, open CORS and request tracing.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/chat", post(handlers::chat::chat))
        .route("/sessions", get(handlers::session::list_sessions))
        .route(
            "/sessions/{id}",
            axum::routing::delete(handlers::session::delete_session),
        )
        .route("/sessions/{id}/history", get(handlers::session::get_history))
        .route("/sessions/{id}/entities", get(handlers::session::get_entities))
        .route("/sessions/{id}/summary", get(handlers::session::get_summary))
        .route("/sessions/{id}/clear", post(handlers::session::clear_session))
        .route("/sessions/{id}/import", post(handlers::session::import_transcript))
        .route("/admin/purge", post(handlers::admin::purge))
        .route("/health", get(handlers::admin::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
