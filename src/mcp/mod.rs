//! MCP endpoint — exposes the greeting and calendar-search tools plus the
//! widget resources over JSON-RPC 2.0.
//!
//! Two transports bind the same dispatcher to the wire:
//! - SSE sessions: `GET /mcp` opens the stream, `POST /mcp/messages`
//!   delivers requests, responses arrive as SSE events.
//! - Stateless HTTP: `POST /mcp` returns the response envelope directly.

pub mod dispatcher;
pub mod http;
pub mod protocol;
pub mod registry;
pub mod sse;
