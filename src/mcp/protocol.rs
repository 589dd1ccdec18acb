// JSON-RPC 2.0 envelope types shared by both transports.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Inbound request envelope `{jsonrpc, id?, method, params?}`. A missing
/// `id` marks a notification — no response is produced for it.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    #[allow(dead_code)]
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl JsonRpcRequest {
    /// An envelope without an `id` is a notification. Method name alone
    /// does not make one: any request carrying an `id` gets a response,
    /// even for `notifications/*` methods.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Outbound response envelope. Exactly one of `result`/`error` is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl JsonRpcError {
    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: format!("Method not found: {}", method),
        }
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: -32602,
            message: message.into(),
        }
    }
}

/// `event: message` frame for the SSE transport.
pub fn sse_message(response: &JsonRpcResponse) -> crate::sessions::OutboundEvent {
    crate::sessions::OutboundEvent {
        event: "message",
        data: serde_json::to_string(response).unwrap_or_else(|_| json!({}).to_string()),
    }
}
