// Tool/resource catalog and invocation.
//
// Descriptors are static — defined here, never created or destroyed at
// runtime. Tool failures from the calendar pipeline are converted into
// structured failure results at this boundary; the dispatcher above only
// ever sees a well-formed result object.

use serde_json::{Value, json};

use super::protocol::JsonRpcError;
use crate::calendar::filter::filter_events;
use crate::state::AppState;

pub const SERVER_NAME: &str = "family-calendar-app";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PROTOCOL_VERSION: &str = "2025-06-18";

const HELLO_WIDGET_URI: &str = "ui://widget/hello.html";
const CALENDAR_WIDGET_URI: &str = "ui://widget/calendar.html";
const WIDGET_MIME: &str = "text/html+skybridge";

const DEFAULT_GREETING_NAME: &str = "World";
const DEFAULT_DAYS_AHEAD: i64 = 30;

// ── tools ───────────────────────────────────────────────────────────────────

pub fn list_tools() -> Value {
    json!({
        "tools": [
            {
                "name": "hello_world",
                "description": "Displays a friendly hello message",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "name": {
                            "type": "string",
                            "description": "Name to greet (defaults to 'World')",
                        },
                    },
                },
            },
            {
                "name": "calendar_search",
                "description": "Search family calendar events. Shows upcoming events, can filter by keywords or date range.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Search query to filter events (searches title, description, location). Leave empty for all events.",
                        },
                        "days": {
                            "type": "number",
                            "description": "Number of days ahead to search (defaults to 30)",
                        },
                    },
                },
            },
        ],
        "_meta": {
            "openai/outputTemplate": HELLO_WIDGET_URI,
        },
    })
}

/// Invoke a tool by name. Arguments are permissive: missing or wrong-typed
/// fields fall back to defaults instead of being rejected.
pub async fn invoke_tool(
    state: &AppState,
    name: &str,
    arguments: &Value,
) -> Result<Value, JsonRpcError> {
    match name {
        "hello_world" => {
            let name = arguments
                .get("name")
                .and_then(|n| n.as_str())
                .filter(|n| !n.is_empty())
                .unwrap_or(DEFAULT_GREETING_NAME);
            tracing::debug!(name = %name, "tools/call: hello_world");
            Ok(json!({
                "content": [{ "type": "text", "text": format!("Greeted {}", name) }],
                "structuredContent": { "greeting": format!("Hello, {}!", name) },
            }))
        }
        "calendar_search" => {
            let query = arguments
                .get("query")
                .and_then(|q| q.as_str())
                .unwrap_or("");
            let days = arguments
                .get("days")
                .and_then(|d| d.as_i64())
                .unwrap_or(DEFAULT_DAYS_AHEAD);
            tracing::info!(query = %query, days, "tools/call: calendar_search");

            match state.cache.get_events().await {
                Ok(events) => {
                    let events = filter_events(&events, query, days, chrono::Utc::now());
                    Ok(json!({
                        "content": [{
                            "type": "text",
                            "text": format!("Found {} event(s)", events.len()),
                        }],
                        "structuredContent": {
                            "events": events,
                            "query": query,
                            "daysAhead": days,
                        },
                        "_meta": {
                            "openai/outputTemplate": CALENDAR_WIDGET_URI,
                        },
                    }))
                }
                Err(err) => {
                    tracing::warn!(error = %err, "calendar_search failed");
                    Ok(json!({
                        "content": [{
                            "type": "text",
                            "text": format!("Failed to search calendar: {}", err),
                        }],
                        "structuredContent": {
                            "events": [],
                            "error": err.to_string(),
                        },
                    }))
                }
            }
        }
        other => Err(JsonRpcError::invalid_params(format!(
            "Unknown tool: {}",
            other
        ))),
    }
}

// ── resources ───────────────────────────────────────────────────────────────

pub fn list_resources() -> Value {
    json!({
        "resources": [
            {
                "uri": HELLO_WIDGET_URI,
                "name": "Hello World Component",
                "mimeType": WIDGET_MIME,
            },
            {
                "uri": CALENDAR_WIDGET_URI,
                "name": "Calendar Events Component",
                "mimeType": WIDGET_MIME,
            },
        ],
    })
}

pub fn read_resource(state: &AppState, uri: &str) -> Result<Value, JsonRpcError> {
    match uri {
        HELLO_WIDGET_URI | CALENDAR_WIDGET_URI => Ok(json!({
            "contents": [{
                "uri": uri,
                "mimeType": WIDGET_MIME,
                "text": widget_html(&state.widget_js),
            }],
        })),
        other => Err(JsonRpcError::invalid_params(format!(
            "Unknown resource URI: {}",
            other
        ))),
    }
}

/// Both widgets hydrate from the same component bundle; the tool result's
/// `_meta` output template selects which view renders.
fn widget_html(component_js: &str) -> String {
    format!(
        "<div id=\"root\"></div>\n<script type=\"module\">{}</script>",
        component_js
    )
}
