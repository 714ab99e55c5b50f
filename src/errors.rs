use thiserror::Error;

/// Result type alias for PagerDuty Events operations
pub type Result<T> = std::result::Result<T, EventsError>;

/// Errors that can occur when sending events to PagerDuty
///
/// HTTP-level rejections (400, 403, exhausted 429/500 retries, ...) are not
/// errors; they come back as [`EventResult::Error`](crate::EventResult::Error).
#[derive(Debug, Error)]
pub enum EventsError {
    /// Failed to build HTTP client
    #[error("Failed to build HTTP client: {0}")]
    BuildHttpClient(#[source] reqwest::Error),

    /// Proxy address could not be turned into a reqwest proxy
    #[error("Invalid proxy configuration: {0}")]
    Proxy(#[source] reqwest::Error),

    /// Configured API token is not a valid header value
    #[error("Invalid API token header: {0}")]
    InvalidHeader(#[source] reqwest::header::InvalidHeaderValue),

    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest_middleware::Error),

    /// Response arrived but its body could not be read
    #[error("Failed to read response body: {0}")]
    ReadBody(#[source] reqwest::Error),

    /// Failed to serialize the event
    #[error("Failed to serialize event: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Event failed validation in its constructor
    #[error("Invalid event: {field} {reason}")]
    InvalidEvent {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: &'static str,
    },
}

impl EventsError {
    pub(crate) fn blank(field: &'static str) -> Self {
        Self::InvalidEvent {
            field,
            reason: "must not be blank",
        }
    }

    /// Check if the error happened at the network layer
    ///
    /// Returns `true` for:
    /// - Connection errors (DNS, refused, reset)
    /// - Timeout errors
    /// - Bodies that could not be read off the wire
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Request(reqwest_middleware::Error::Reqwest(err)) => {
                err.is_connect() || err.is_timeout() || err.is_request() || err.is_body()
            }
            Self::Request(reqwest_middleware::Error::Middleware(source)) => {
                source
                    .chain()
                    .find_map(|inner| inner.downcast_ref::<reqwest::Error>())
                    .is_some_and(|err| err.is_connect() || err.is_timeout())
            }
            Self::ReadBody(_) => true,
            _ => false,
        }
    }
}
