use std::fmt::{Display, Formatter};

/// Outcome of sending one event to PagerDuty
///
/// Exactly one of `Success` or `Error`. HTTP-level failures are reported here
/// rather than as an [`EventsError`](crate::EventsError).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventResult {
    /// Event was accepted (HTTP 200, 201 or 202)
    Success {
        status: String,
        message: String,
        /// Key PagerDuty uses to correlate later events with this incident
        dedup_key: Option<String>,
    },
    /// Event was rejected, or retries ran out
    Error {
        status: String,
        message: String,
        /// JSON text of the `errors` array, or the raw response body
        errors: Option<String>,
    },
}

impl EventResult {
    pub fn success(status: &str, message: &str, dedup_key: Option<&str>) -> Self {
        EventResult::Success {
            status: status.to_string(),
            message: message.to_string(),
            dedup_key: dedup_key.map(str::to_string),
        }
    }

    pub fn error(status: &str, message: &str, errors: Option<&str>) -> Self {
        EventResult::Error {
            status: status.to_string(),
            message: message.to_string(),
            errors: errors.map(str::to_string),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, EventResult::Success { .. })
    }

    pub fn status(&self) -> &str {
        match self {
            EventResult::Success { status, .. } | EventResult::Error { status, .. } => status,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            EventResult::Success { message, .. } | EventResult::Error { message, .. } => message,
        }
    }

    /// Dedup key of a successful result
    pub fn dedup_key(&self) -> Option<&str> {
        match self {
            EventResult::Success { dedup_key, .. } => dedup_key.as_deref(),
            EventResult::Error { .. } => None,
        }
    }

    /// Error detail of a failed result
    pub fn errors(&self) -> Option<&str> {
        match self {
            EventResult::Success { .. } => None,
            EventResult::Error { errors, .. } => errors.as_deref(),
        }
    }
}

impl Display for EventResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EventResult::Success {
                status,
                message,
                dedup_key,
            } => write!(
                f,
                "success: {status} - {message} (dedup_key: {})",
                dedup_key.as_deref().unwrap_or("none")
            ),
            EventResult::Error {
                status,
                message,
                errors,
            } => write!(
                f,
                "error: {status} - {message} (errors: {})",
                errors.as_deref().unwrap_or("none")
            ),
        }
    }
}
