// Event cache — time-bounded memoization of the full parsed event set.
//
// One instance exists per process, constructed at startup and handed to the
// components that need it through `AppState`. The lock is held across the
// upstream fetch, so at most one fetch is in flight at a time; callers that
// queued behind it adopt that fetch's outcome instead of issuing their own.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use super::CalendarEvent;
use super::fetcher::EventSource;
use crate::error::CalendarError;

/// Cached entries older than this are refetched on the next read.
const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

struct CacheEntry {
    events: Vec<CalendarEvent>,
    fetched_at: Instant,
}

struct CacheState {
    entry: Option<CacheEntry>,
    /// Outcome of the most recent fetch attempt that failed. Kept so a
    /// caller that was already waiting when the failure happened shares the
    /// error rather than hammering the feed again.
    last_failure: Option<(Instant, CalendarError)>,
}

pub struct EventCache {
    source: Box<dyn EventSource>,
    state: Mutex<CacheState>,
    ttl: Duration,
}

impl EventCache {
    pub fn new(source: Box<dyn EventSource>) -> Self {
        Self::with_ttl(source, CACHE_TTL)
    }

    /// TTL-injecting constructor; tests use short TTLs to exercise expiry.
    pub fn with_ttl(source: Box<dyn EventSource>, ttl: Duration) -> Self {
        Self {
            source,
            state: Mutex::new(CacheState {
                entry: None,
                last_failure: None,
            }),
            ttl,
        }
    }

    /// Return the full (unfiltered) event set, refetching when the cached
    /// entry has expired. A fetch failure propagates but never evicts a
    /// previously cached entry.
    pub async fn get_events(&self) -> Result<Vec<CalendarEvent>, CalendarError> {
        let arrived = Instant::now();
        let mut state = self.state.lock().await;

        if let Some(entry) = &state.entry {
            if entry.fetched_at.elapsed() < self.ttl {
                tracing::debug!("calendar: serving cached event set");
                return Ok(entry.events.clone());
            }
        }

        // A fetch that completed while we were queued behind the lock is
        // our outcome too: success was handled above (fresh entry), failure
        // is shared here.
        if let Some((at, err)) = &state.last_failure {
            if *at >= arrived {
                return Err(err.clone());
            }
        }

        match self.source.fetch().await {
            Ok(events) => {
                tracing::info!(count = events.len(), "calendar: cache refreshed");
                state.entry = Some(CacheEntry {
                    events: events.clone(),
                    fetched_at: Instant::now(),
                });
                state.last_failure = None;
                Ok(events)
            }
            Err(err) => {
                tracing::warn!(error = %err, "calendar: fetch failed, keeping stale entry");
                state.last_failure = Some((Instant::now(), err.clone()));
                Err(err)
            }
        }
    }

    /// Age of the cached entry, if any. Surfaced by the health endpoint.
    pub async fn entry_age(&self) -> Option<Duration> {
        self.state
            .lock()
            .await
            .entry
            .as_ref()
            .map(|e| e.fetched_at.elapsed())
    }
}
