// Error taxonomy for the calendar pipeline.
//
// Both variants carry pre-rendered strings (rather than the underlying
// reqwest/parser errors) so a fetch outcome can be cloned to every caller
// that coalesced onto the same upstream request.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CalendarError {
    /// Upstream unreachable: connection refused, timeout, TLS failure,
    /// or a non-success HTTP status from the feed host.
    #[error("Failed to fetch calendar: {0}")]
    Network(String),

    /// The feed responded but the body is not valid iCalendar data.
    #[error("Failed to parse calendar: {0}")]
    Parse(String),
}
