// Session registry — maps opaque session identifiers to live SSE transport
// handles.
//
// The registry exclusively owns the id → session mapping. Lookup and close
// are synchronous map operations (the lock is never held across an await),
// so transport code can call `close` from a Drop guard. `close` is
// idempotent: transport teardown and administrative close both funnel
// through it, and whichever fires first wins.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Instant;

use tokio::sync::mpsc;
use uuid::Uuid;

/// Outbound queue depth per session. Responses beyond this back-pressure the
/// message POST handler rather than growing without bound.
const SESSION_CHANNEL_CAPACITY: usize = 64;

/// One server-to-client frame: an SSE event name plus its data payload.
/// Kept transport-shaped but inspectable, so tests can assert on payloads
/// without decoding wire frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEvent {
    pub event: &'static str,
    pub data: String,
}

struct Session {
    tx: mpsc::Sender<OutboundEvent>,
    opened_at: Instant,
}

#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session and hand back its identifier plus the receiver
    /// end the SSE stream drains. The id is a fresh UUID, unique among live
    /// sessions by construction.
    pub fn create(&self) -> (String, mpsc::Receiver<OutboundEvent>) {
        let (tx, rx) = mpsc::channel(SESSION_CHANNEL_CAPACITY);
        let id = Uuid::new_v4().to_string();
        let mut sessions = self.sessions.write().unwrap_or_else(|p| p.into_inner());
        sessions.insert(
            id.clone(),
            Session {
                tx,
                opened_at: Instant::now(),
            },
        );
        tracing::info!(session_id = %id, "session opened");
        (id, rx)
    }

    /// Clone of the outbound sender for a live session. Returns `None` once
    /// the session has been closed.
    pub fn lookup(&self, id: &str) -> Option<mpsc::Sender<OutboundEvent>> {
        let sessions = self.sessions.read().unwrap_or_else(|p| p.into_inner());
        sessions.get(id).map(|s| s.tx.clone())
    }

    /// Remove a session and release its transport handle. Safe to call any
    /// number of times; a second close is a no-op. An in-flight dispatch
    /// holding a cloned sender may still complete — its delivery simply
    /// fails and is discarded.
    pub fn close(&self, id: &str) {
        let mut sessions = self.sessions.write().unwrap_or_else(|p| p.into_inner());
        if sessions.remove(id).is_some() {
            tracing::info!(session_id = %id, "session closed");
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identifiers and ages of live sessions, for the admin listing.
    pub fn snapshot(&self) -> Vec<(String, u64)> {
        let sessions = self.sessions.read().unwrap_or_else(|p| p.into_inner());
        sessions
            .iter()
            .map(|(id, s)| (id.clone(), s.opened_at.elapsed().as_secs()))
            .collect()
    }
}
