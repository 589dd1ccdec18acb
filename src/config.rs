// Runtime configuration, resolved once at startup from the environment.

use std::time::Duration;

const DEFAULT_PORT: u16 = 2091;
const DEFAULT_FEED_URL: &str = "https://paulsnider.net/family/family-calendar-combined.ics";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP server binds to (`PORT`).
    pub port: u16,
    /// Remote iCalendar feed (`CALENDAR_FEED_URL`).
    pub feed_url: String,
    /// Upper bound for a single upstream fetch (`CALENDAR_FETCH_TIMEOUT_SECS`).
    pub fetch_timeout: Duration,
    /// Path to the built widget component bundle (`WIDGET_BUNDLE_PATH`).
    /// When unset, an embedded stub script is served instead.
    pub widget_bundle_path: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let feed_url = std::env::var("CALENDAR_FEED_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_FEED_URL.to_string());

        let fetch_timeout = std::env::var("CALENDAR_FETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS));

        let widget_bundle_path = std::env::var("WIDGET_BUNDLE_PATH")
            .ok()
            .filter(|s| !s.is_empty());

        Self {
            port,
            feed_url,
            fetch_timeout,
            widget_bundle_path,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            feed_url: DEFAULT_FEED_URL.to_string(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            widget_bundle_path: None,
        }
    }
}
