// Pure, deterministic event filtering. Takes `now` as a parameter so the
// window math is testable without a clock.

use chrono::{DateTime, Duration, Utc};

use super::CalendarEvent;

/// Hard cap on results returned to the widget.
const MAX_RESULTS: usize = 20;

/// Select events starting within `[now, now + days_ahead days]` (inclusive
/// on both ends) that match `query`, sorted ascending by start time and
/// truncated to [`MAX_RESULTS`].
///
/// `days_ahead <= 0` yields an empty window. A query that is empty after
/// trimming applies no text filter; otherwise matching is a case-insensitive
/// substring test against summary, description, or location.
pub fn filter_events(
    events: &[CalendarEvent],
    query: &str,
    days_ahead: i64,
    now: DateTime<Utc>,
) -> Vec<CalendarEvent> {
    if days_ahead <= 0 {
        return Vec::new();
    }
    // Saturate rather than overflow: a huge horizon just means "no upper
    // bound within representable time".
    let horizon = Duration::try_days(days_ahead)
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    let query = query.trim().to_lowercase();

    let mut selected: Vec<CalendarEvent> = events
        .iter()
        .filter(|e| e.start >= now && e.start <= horizon)
        .filter(|e| {
            query.is_empty()
                || e.summary.to_lowercase().contains(&query)
                || e.description.to_lowercase().contains(&query)
                || e.location.to_lowercase().contains(&query)
        })
        .cloned()
        .collect();

    // Stable: ties keep their original relative order.
    selected.sort_by_key(|e| e.start);
    selected.truncate(MAX_RESULTS);
    selected
}
