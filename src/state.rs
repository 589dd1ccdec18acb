// Application state — constructed once in `main`, cloned into handlers.

use std::sync::Arc;
use std::time::Instant;

use crate::calendar::cache::EventCache;
use crate::calendar::fetcher::{EventSource, IcsFetcher};
use crate::config::Config;
use crate::sessions::SessionRegistry;

/// Served when no component bundle is configured; real deployments point
/// `WIDGET_BUNDLE_PATH` at the built `component.js`.
const WIDGET_STUB_JS: &str =
    "document.getElementById('root').textContent = 'Widget bundle not configured';";

#[derive(Clone)]
pub struct AppState {
    /// Process-wide event cache; the only owner of upstream calendar data.
    pub cache: Arc<EventCache>,
    /// Owner of the session id → transport handle mapping.
    pub sessions: Arc<SessionRegistry>,
    /// Component bundle inlined into the widget resources.
    pub widget_js: Arc<String>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .expect("Failed to build HTTP client");

        let fetcher = IcsFetcher::new(client, config.feed_url.clone());
        Self::with_source(config, Box::new(fetcher))
    }

    /// Construct with an explicit event source. This is the seam tests use
    /// to run the full stack without touching the network.
    pub fn with_source(config: &Config, source: Box<dyn EventSource>) -> Self {
        let widget_js = match &config.widget_bundle_path {
            Some(path) => match std::fs::read_to_string(path) {
                Ok(js) => {
                    tracing::info!(path = %path, bytes = js.len(), "widget bundle loaded");
                    js
                }
                Err(e) => {
                    tracing::warn!(path = %path, error = %e, "widget bundle unreadable, serving stub");
                    WIDGET_STUB_JS.to_string()
                }
            },
            None => WIDGET_STUB_JS.to_string(),
        };

        Self {
            cache: Arc::new(EventCache::new(source)),
            sessions: Arc::new(SessionRegistry::new()),
            widget_js: Arc::new(widget_js),
            start_time: Instant::now(),
        }
    }

    #[cfg(test)]
    pub fn for_tests(events: Vec<crate::calendar::CalendarEvent>) -> Self {
        struct StaticSource(Vec<crate::calendar::CalendarEvent>);

        #[async_trait::async_trait]
        impl EventSource for StaticSource {
            async fn fetch(
                &self,
            ) -> Result<Vec<crate::calendar::CalendarEvent>, crate::error::CalendarError>
            {
                Ok(self.0.clone())
            }
        }

        Self::with_source(&Config::default(), Box::new(StaticSource(events)))
    }
}
