// Event-feed fetcher — retrieves the remote .ics document and parses it
// into normalized `CalendarEvent`s. No retry here; the cache decides retry
// policy by re-attempting on the next stale read.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use icalendar::{
    Calendar, CalendarComponent, CalendarDateTime, Component, DatePerhapsTime, EventLike,
};

use super::CalendarEvent;
use crate::error::CalendarError;

const UNTITLED: &str = "Untitled Event";

/// Seam between the cache and the upstream feed. The production
/// implementation is [`IcsFetcher`]; tests substitute counting mocks.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<CalendarEvent>, CalendarError>;
}

/// Fetches an iCalendar document over HTTPS.
pub struct IcsFetcher {
    client: reqwest::Client,
    url: String,
}

impl IcsFetcher {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl EventSource for IcsFetcher {
    async fn fetch(&self) -> Result<Vec<CalendarEvent>, CalendarError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| CalendarError::Network(e.to_string()))?
            .error_for_status()
            .map_err(|e| CalendarError::Network(e.to_string()))?;

        let body = response
            .text()
            .await
            .map_err(|e| CalendarError::Network(e.to_string()))?;

        let events = parse_ics(&body)?;
        tracing::debug!(count = events.len(), "calendar: feed fetched and parsed");
        Ok(events)
    }
}

/// Parse an iCalendar document into events. Only `VEVENT` components with a
/// resolvable `DTSTART` are kept — free-busy blocks, todos and other
/// component types are not events.
pub fn parse_ics(input: &str) -> Result<Vec<CalendarEvent>, CalendarError> {
    let calendar: Calendar = input
        .parse()
        .map_err(|e: String| CalendarError::Parse(e))?;

    let mut events = Vec::new();
    for component in &calendar.components {
        let CalendarComponent::Event(event) = component else {
            continue;
        };
        let Some(start) = event.get_start().and_then(to_utc) else {
            continue;
        };
        events.push(CalendarEvent {
            summary: event
                .get_summary()
                .filter(|s| !s.is_empty())
                .unwrap_or(UNTITLED)
                .to_string(),
            start,
            end: event.get_end().and_then(to_utc),
            location: event.property_value("LOCATION").unwrap_or_default().to_string(),
            description: event.get_description().unwrap_or_default().to_string(),
        });
    }
    Ok(events)
}

/// Resolve an iCalendar date or date-time to UTC. All-day dates become
/// midnight UTC; floating times are taken as UTC; zoned times convert via
/// chrono-tz, falling back to UTC when the TZID is unknown.
fn to_utc(value: DatePerhapsTime) -> Option<DateTime<Utc>> {
    match value {
        DatePerhapsTime::Date(date) => date
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive)),
        DatePerhapsTime::DateTime(dt) => match dt {
            CalendarDateTime::Utc(utc) => Some(utc),
            CalendarDateTime::Floating(naive) => Some(Utc.from_utc_datetime(&naive)),
            CalendarDateTime::WithTimezone { date_time, tzid } => match tzid.parse::<Tz>() {
                Ok(tz) => tz
                    .from_local_datetime(&date_time)
                    .single()
                    .map(|zoned| zoned.with_timezone(&Utc)),
                Err(_) => {
                    tracing::warn!(tzid = %tzid, "calendar: unknown TZID, treating as UTC");
                    Some(Utc.from_utc_datetime(&date_time))
                }
            },
        },
    }
}
