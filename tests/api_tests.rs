use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use familycal_mcp::calendar::CalendarEvent;
use familycal_mcp::calendar::fetcher::EventSource;
use familycal_mcp::config::Config;
use familycal_mcp::error::CalendarError;
use familycal_mcp::state::AppState;

/// Event source with canned data (or a canned failure) so the full stack
/// runs without network access.
struct StaticSource {
    events: Vec<CalendarEvent>,
    fail: Option<CalendarError>,
}

#[async_trait::async_trait]
impl EventSource for StaticSource {
    async fn fetch(&self) -> Result<Vec<CalendarEvent>, CalendarError> {
        match &self.fail {
            Some(err) => Err(err.clone()),
            None => Ok(self.events.clone()),
        }
    }
}

fn test_state(events: Vec<CalendarEvent>) -> AppState {
    AppState::with_source(
        &Config::default(),
        Box::new(StaticSource { events, fail: None }),
    )
}

fn failing_state() -> AppState {
    AppState::with_source(
        &Config::default(),
        Box::new(StaticSource {
            events: vec![],
            fail: Some(CalendarError::Network("connection refused".into())),
        }),
    )
}

fn app(state: AppState) -> axum::Router {
    familycal_mcp::create_router(state)
}

fn event(summary: &str, description: &str, days_from_now: i64) -> CalendarEvent {
    CalendarEvent {
        summary: summary.to_string(),
        start: Utc::now() + Duration::days(days_from_now),
        end: None,
        location: String::new(),
        description: description.to_string(),
    }
}

fn rpc(method: &str, params: Value) -> Request<Body> {
    let envelope = json!({ "jsonrpc": "2.0", "id": 1, "method": method, "params": params });
    Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&envelope).unwrap()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════
//  Stateless transport: POST /mcp
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn initialize_returns_server_info() {
    let response = app(test_state(vec![]))
        .oneshot(rpc("initialize", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["jsonrpc"], "2.0");
    assert_eq!(body["id"], 1);
    assert_eq!(body["result"]["serverInfo"]["name"], "family-calendar-app");
    assert!(body["result"]["protocolVersion"].is_string());
}

#[tokio::test]
async fn tools_list_has_both_tools() {
    let response = app(test_state(vec![]))
        .oneshot(rpc("tools/list", json!({})))
        .await
        .unwrap();

    let body = body_json(response).await;
    let tools = body["result"]["tools"].as_array().unwrap();
    let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["hello_world", "calendar_search"]);
    assert_eq!(
        body["result"]["_meta"]["openai/outputTemplate"],
        "ui://widget/hello.html"
    );
}

#[tokio::test]
async fn hello_world_greets_default_name() {
    let params = json!({ "name": "hello_world", "arguments": {} });
    let response = app(test_state(vec![]))
        .oneshot(rpc("tools/call", params))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(
        body["result"]["structuredContent"]["greeting"],
        "Hello, World!"
    );
    assert_eq!(body["result"]["content"][0]["text"], "Greeted World");
}

#[tokio::test]
async fn calendar_search_filters_and_shapes_result() {
    let state = test_state(vec![
        event("Practice", "weekly soccer drills", 2),
        event("Game day", "soccer match", 1),
        event("Recital", "piano", 3),
    ]);
    let params = json!({
        "name": "calendar_search",
        "arguments": { "query": "soccer", "days": 7 },
    });
    let response = app(state).oneshot(rpc("tools/call", params)).await.unwrap();

    let body = body_json(response).await;
    let result = &body["result"];
    assert_eq!(result["content"][0]["text"], "Found 2 event(s)");
    let events = result["structuredContent"]["events"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["summary"], "Game day");
    assert_eq!(events[1]["summary"], "Practice");
    assert_eq!(result["structuredContent"]["query"], "soccer");
    assert_eq!(result["structuredContent"]["daysAhead"], 7);
    assert_eq!(
        result["_meta"]["openai/outputTemplate"],
        "ui://widget/calendar.html"
    );
}

#[tokio::test]
async fn calendar_search_failure_is_a_structured_result() {
    let params = json!({ "name": "calendar_search", "arguments": {} });
    let response = app(failing_state())
        .oneshot(rpc("tools/call", params))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let result = &body["result"];
    assert!(body["error"].is_null());
    assert_eq!(result["structuredContent"]["events"], json!([]));
    assert_eq!(
        result["structuredContent"]["error"],
        "Failed to fetch calendar: connection refused"
    );
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("Failed to search calendar"));
}

#[tokio::test]
async fn calendar_search_with_huge_days_is_well_formed() {
    let state = test_state(vec![event("Game day", "soccer match", 1)]);
    let params = json!({
        "name": "calendar_search",
        "arguments": { "days": 100_000_000i64 },
    });
    let response = app(state).oneshot(rpc("tools/call", params)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let events = body["result"]["structuredContent"]["events"]
        .as_array()
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(body["result"]["structuredContent"]["daysAhead"], 100_000_000i64);
}

#[tokio::test]
async fn resources_list_and_read() {
    let state = test_state(vec![]);

    let response = app(state.clone())
        .oneshot(rpc("resources/list", json!({})))
        .await
        .unwrap();
    let body = body_json(response).await;
    let resources = body["result"]["resources"].as_array().unwrap();
    assert_eq!(resources.len(), 2);
    assert_eq!(resources[0]["mimeType"], "text/html+skybridge");

    let response = app(state)
        .oneshot(rpc("resources/read", json!({ "uri": "ui://widget/hello.html" })))
        .await
        .unwrap();
    let body = body_json(response).await;
    let text = body["result"]["contents"][0]["text"].as_str().unwrap();
    assert!(text.contains("<div id=\"root\"></div>"));
}

#[tokio::test]
async fn unknown_method_returns_rpc_error() {
    let response = app(test_state(vec![]))
        .oneshot(rpc("bogus/method", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], -32601);
    assert!(body["result"].is_null());
}

#[tokio::test]
async fn notification_gets_empty_ack() {
    let envelope = json!({ "jsonrpc": "2.0", "method": "notifications/initialized" });
    let request = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&envelope).unwrap()))
        .unwrap();

    let response = app(test_state(vec![])).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({}));
}

#[tokio::test]
async fn notification_method_with_id_gets_a_response() {
    let response = app(test_state(vec![]))
        .oneshot(rpc("notifications/initialized", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], 1);
    assert_eq!(body["error"]["code"], -32601);
}

// ═══════════════════════════════════════════════════════════════════════════
//  Streaming transport: GET /mcp + POST /mcp/messages
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn head_probe_does_not_open_a_session() {
    let state = test_state(vec![]);
    let response = app(state.clone())
        .oneshot(
            Request::builder()
                .method("HEAD")
                .uri("/mcp")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "text/event-stream"
    );
    assert_eq!(state.sessions.len(), 0);
}

#[tokio::test]
async fn message_without_session_id_is_rejected() {
    let envelope = json!({ "jsonrpc": "2.0", "id": 1, "method": "ping" });
    let request = Request::builder()
        .method("POST")
        .uri("/mcp/messages")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&envelope).unwrap()))
        .unwrap();

    let response = app(test_state(vec![])).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn message_for_unknown_session_is_404() {
    let envelope = json!({ "jsonrpc": "2.0", "id": 1, "method": "ping" });
    let request = Request::builder()
        .method("POST")
        .uri("/mcp/messages?sessionId=not-a-session")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&envelope).unwrap()))
        .unwrap();

    let response = app(test_state(vec![])).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn session_message_delivers_response_on_stream() {
    let state = test_state(vec![]);
    let (session_id, mut rx) = state.sessions.create();

    let envelope = json!({
        "jsonrpc": "2.0",
        "id": 7,
        "method": "tools/call",
        "params": { "name": "hello_world", "arguments": {} },
    });
    let request = Request::builder()
        .method("POST")
        .uri(format!("/mcp/messages?sessionId={session_id}"))
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&envelope).unwrap()))
        .unwrap();

    let response = app(state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let frame = rx.recv().await.expect("response event on session stream");
    assert_eq!(frame.event, "message");
    let body: Value = serde_json::from_str(&frame.data).unwrap();
    assert_eq!(body["id"], 7);
    assert_eq!(
        body["result"]["structuredContent"]["greeting"],
        "Hello, World!"
    );
}

#[tokio::test]
async fn session_responses_arrive_in_request_order() {
    let state = test_state(vec![]);
    let (session_id, mut rx) = state.sessions.create();

    for id in [1, 2] {
        let envelope = json!({ "jsonrpc": "2.0", "id": id, "method": "ping" });
        let request = Request::builder()
            .method("POST")
            .uri(format!("/mcp/messages?sessionId={session_id}"))
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&envelope).unwrap()))
            .unwrap();
        let response = app(state.clone()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    for expected_id in [1, 2] {
        let frame = rx.recv().await.expect("response event in order");
        assert_eq!(frame.event, "message");
        let body: Value = serde_json::from_str(&frame.data).unwrap();
        assert_eq!(body["id"], expected_id);
    }
}

#[tokio::test]
async fn both_transports_produce_identical_results() {
    let state = test_state(vec![]);
    let params = json!({ "name": "hello_world", "arguments": {} });

    // Stateless path.
    let response = app(state.clone())
        .oneshot(rpc("tools/call", params.clone()))
        .await
        .unwrap();
    let stateless = body_json(response).await["result"].clone();

    // Session path.
    let (session_id, mut rx) = state.sessions.create();
    let envelope = json!({ "jsonrpc": "2.0", "id": 1, "method": "tools/call", "params": params });
    let request = Request::builder()
        .method("POST")
        .uri(format!("/mcp/messages?sessionId={session_id}"))
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&envelope).unwrap()))
        .unwrap();
    app(state).oneshot(request).await.unwrap();

    let frame = rx.recv().await.unwrap();
    let streamed: Value = serde_json::from_str(&frame.data).unwrap();

    assert_eq!(stateless, streamed["result"]);
}

// ═══════════════════════════════════════════════════════════════════════════
//  Operational endpoints
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn health_reports_sessions_and_uptime() {
    let state = test_state(vec![]);
    let (_id, _rx) = state.sessions.create();

    let response = app(state)
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["app"], "family-calendar-app");
    assert_eq!(body["sessions"], 1);
    assert!(body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn admin_close_removes_session() {
    let state = test_state(vec![]);
    let (session_id, _rx) = state.sessions.create();

    let response = app(state.clone())
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/sessions/{session_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(state.sessions.lookup(&session_id).is_none());

    // Closing again is a no-op, not an error.
    let response = app(state)
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/sessions/{session_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let response = app(test_state(vec![]))
        .oneshot(
            Request::builder()
                .uri("/api/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
