// Stateless transport adapter — one JSON-RPC envelope in, one out, no
// session affinity. Used by clients that cannot hold an SSE stream open.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::{Value, json};

use super::dispatcher::dispatch;
use super::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use crate::state::AppState;

pub async fn mcp_post(
    State(state): State<AppState>,
    Json(raw): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let request: JsonRpcRequest = match serde_json::from_value(raw) {
        Ok(r) => r,
        Err(e) => {
            let error = JsonRpcError {
                code: -32600,
                message: format!("Invalid Request: {}", e),
            };
            let response = JsonRpcResponse::failure(Value::Null, error);
            return (StatusCode::OK, Json(json_value(&response)));
        }
    };

    // Notifications get an empty ack body, mirroring the session path where
    // they produce no response event.
    if request.is_notification() {
        return (StatusCode::OK, Json(json!({})));
    }

    let id = request.id.clone().unwrap_or(Value::Null);
    let response = match dispatch(&state, &request.method, &request.params).await {
        Ok(result) => JsonRpcResponse::success(id, result),
        Err(error) => JsonRpcResponse::failure(id, error),
    };

    (StatusCode::OK, Json(json_value(&response)))
}

fn json_value(response: &JsonRpcResponse) -> Value {
    serde_json::to_value(response).unwrap_or_else(|_| json!({}))
}
