// Streaming transport adapter — SSE sessions.
//
// `GET /mcp` registers a session and streams responses; the first event is
// the MCP `endpoint` event telling the client where to POST its requests.
// `POST /mcp/messages?sessionId=...` routes a request envelope to the
// dispatcher and queues the response on that session's stream. The session
// closes when the peer disconnects (stream drop), on send error, or via the
// admin endpoint — all through the registry's idempotent `close`.

use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{Method, StatusCode, header};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures_util::Stream;
use serde::Deserialize;
use serde_json::Value;
use tokio_stream::wrappers::ReceiverStream;

use super::dispatcher::dispatch;
use super::protocol::{JsonRpcRequest, JsonRpcResponse, sse_message};
use crate::sessions::{OutboundEvent, SessionRegistry};
use crate::state::AppState;

const MESSAGES_PATH: &str = "/mcp/messages";

// ── GET /mcp — open a session ───────────────────────────────────────────────

pub async fn sse_connect(method: Method, State(state): State<AppState>) -> Response {
    // HEAD probes must not register a session.
    if method == Method::HEAD {
        return sse_probe_response();
    }

    let (session_id, rx) = state.sessions.create();

    // First event on the stream: where to POST messages for this session.
    if let Some(tx) = state.sessions.lookup(&session_id) {
        let endpoint = OutboundEvent {
            event: "endpoint",
            data: format!("{}?sessionId={}", MESSAGES_PATH, session_id),
        };
        // Channel is freshly created; capacity cannot be exhausted yet.
        let _ = tx.try_send(endpoint);
    }

    let stream = SessionStream {
        inner: ReceiverStream::new(rx),
        sessions: state.sessions.clone(),
        session_id,
    };

    Sse::new(stream)
        .keep_alive(KeepAlive::default())
        .into_response()
}

fn sse_probe_response() -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
    )
        .into_response()
}

/// Receiver stream that deregisters its session when the transport goes
/// away. Dropping the stream is the transport-error/disconnect callback.
struct SessionStream {
    inner: ReceiverStream<OutboundEvent>,
    sessions: Arc<SessionRegistry>,
    session_id: String,
}

impl Stream for SessionStream {
    type Item = Result<Event, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner)
            .poll_next(cx)
            .map(|item| item.map(|out| Ok(Event::default().event(out.event).data(out.data))))
    }
}

impl Drop for SessionStream {
    fn drop(&mut self) {
        self.sessions.close(&self.session_id);
    }
}

// ── POST /mcp/messages — inbound request for a session ──────────────────────

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

pub async fn post_message(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
    Json(raw): Json<Value>,
) -> Response {
    let Some(session_id) = query.session_id.filter(|s| !s.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            "Missing sessionId query parameter",
        )
            .into_response();
    };

    let Some(tx) = state.sessions.lookup(&session_id) else {
        tracing::warn!(session_id = %session_id, "message for unknown session");
        return (StatusCode::NOT_FOUND, "Unknown session").into_response();
    };

    let request: JsonRpcRequest = match serde_json::from_value(raw) {
        Ok(r) => r,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                format!("Invalid JSON-RPC envelope: {}", e),
            )
                .into_response();
        }
    };

    if request.is_notification() {
        return (StatusCode::ACCEPTED, "Accepted").into_response();
    }

    let id = request.id.clone().unwrap_or(Value::Null);
    let response = match dispatch(&state, &request.method, &request.params).await {
        Ok(result) => JsonRpcResponse::success(id, result),
        Err(error) => JsonRpcResponse::failure(id, error),
    };

    // The session may have closed while we were dispatching; an
    // undeliverable response is discarded, not retried.
    if tx.send(sse_message(&response)).await.is_err() {
        tracing::debug!(session_id = %session_id, "session closed before delivery, response discarded");
        state.sessions.close(&session_id);
    }

    (StatusCode::ACCEPTED, "Accepted").into_response()
}
