pub mod calendar;
pub mod config;
pub mod error;
pub mod handlers;
pub mod mcp;
pub mod sessions;
pub mod state;

use axum::Router;
use axum::routing::{delete, get, post};

use state::AppState;

/// Build the application router with the given state.
/// Extracted from `main()` so integration tests can construct the app
/// without binding to a network port.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // MCP streaming transport (legacy /mcp/sse alias kept for older clients)
        .route("/mcp", get(mcp::sse::sse_connect).post(mcp::http::mcp_post))
        .route("/mcp/sse", get(mcp::sse::sse_connect))
        .route("/mcp/messages", post(mcp::sse::post_message))
        // Health
        .route("/api/health", get(handlers::health))
        // Session administration
        .route("/api/sessions", get(handlers::list_sessions))
        .route("/api/sessions/{id}", delete(handlers::close_session))
        // Shared state
        .with_state(state)
}
