// Transport-agnostic request routing.
//
// Both the SSE session path and the stateless HTTP path call into this one
// function, so a given method + params pair produces a structurally
// identical result regardless of which wire it arrived on.

use serde_json::{Value, json};

use super::protocol::JsonRpcError;
use super::registry;
use crate::state::AppState;

pub async fn dispatch(
    state: &AppState,
    method: &str,
    params: &Value,
) -> Result<Value, JsonRpcError> {
    tracing::debug!(method = %method, "mcp: dispatching request");

    match method {
        "initialize" => Ok(json!({
            "protocolVersion": registry::PROTOCOL_VERSION,
            "capabilities": {
                "resources": {},
                "tools": {},
            },
            "serverInfo": {
                "name": registry::SERVER_NAME,
                "version": registry::SERVER_VERSION,
            },
        })),
        "ping" => Ok(json!({})),
        "tools/list" => Ok(registry::list_tools()),
        "tools/call" => {
            let name = params.get("name").and_then(|n| n.as_str()).unwrap_or("");
            if name.is_empty() {
                return Err(JsonRpcError::invalid_params("Missing 'name' in params"));
            }
            let arguments = params.get("arguments").cloned().unwrap_or(json!({}));
            registry::invoke_tool(state, name, &arguments).await
        }
        "resources/list" => Ok(registry::list_resources()),
        "resources/read" => {
            let uri = params.get("uri").and_then(|u| u.as_str()).unwrap_or("");
            registry::read_resource(state, uri)
        }
        other => Err(JsonRpcError::method_not_found(other)),
    }
}
