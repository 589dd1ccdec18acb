// Operational endpoints: health and session administration.

use axum::Json;
use axum::extract::{Path, State};
use serde_json::{Value, json};

use crate::mcp::registry;
use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let cache_age = state.cache.entry_age().await.map(|d| d.as_secs());
    Json(json!({
        "status": "ok",
        "app": registry::SERVER_NAME,
        "version": registry::SERVER_VERSION,
        "uptime_seconds": state.start_time.elapsed().as_secs(),
        "sessions": state.sessions.len(),
        "cache_age_seconds": cache_age,
    }))
}

pub async fn list_sessions(State(state): State<AppState>) -> Json<Value> {
    let sessions: Vec<Value> = state
        .sessions
        .snapshot()
        .into_iter()
        .map(|(id, age)| json!({ "id": id, "age_seconds": age }))
        .collect();
    Json(json!({ "sessions": sessions }))
}

/// Administrative close. Funnels through the same idempotent registry path
/// as transport teardown, so closing an already-gone session succeeds.
pub async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Value> {
    state.sessions.close(&id);
    Json(json!({ "closed": id }))
}
