// Calendar pipeline: fetch the remote iCalendar feed, cache the parsed
// event set with a TTL, and filter it per tool call.

pub mod cache;
pub mod fetcher;
pub mod filter;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One normalized calendar event. Immutable once produced by the fetcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub summary: String,
    pub start: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    pub location: String,
    pub description: String,
}
