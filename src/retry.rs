//! Per-status retry schedules for transient upstream failures.
//!
//! Server errors and rate limiting get separate schedules: a 500 usually
//! clears within a couple of seconds, a 429 needs the throttling window to
//! pass. The length of each schedule is the retry budget for that status.

use reqwest::StatusCode;
use std::time::Duration;

/// Response statuses that may be retried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetryableStatus {
    /// HTTP 500
    ServerError,
    /// HTTP 429
    RateLimited,
}

impl RetryableStatus {
    pub fn from_status(status: StatusCode) -> Option<Self> {
        match status {
            StatusCode::INTERNAL_SERVER_ERROR => Some(Self::ServerError),
            StatusCode::TOO_MANY_REQUESTS => Some(Self::RateLimited),
            _ => None,
        }
    }
}

/// Delays applied between retries, one schedule per [`RetryableStatus`]
///
/// `schedule[n]` is slept before retry `n + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    server_error: Vec<Duration>,
    rate_limited: Vec<Duration>,
}

impl RetryPolicy {
    pub fn new(server_error: Vec<Duration>, rate_limited: Vec<Duration>) -> Self {
        Self {
            server_error,
            rate_limited,
        }
    }

    /// Policy with empty schedules: every retryable status is terminal
    pub fn disabled() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn schedule(&self, status: RetryableStatus) -> &[Duration] {
        match status {
            RetryableStatus::ServerError => &self.server_error,
            RetryableStatus::RateLimited => &self.rate_limited,
        }
    }

    pub fn max_retries(&self, status: RetryableStatus) -> usize {
        self.schedule(status).len()
    }

    /// Delay before the next retry, or `None` once `retry_count` reaches the budget
    pub fn delay(&self, status: RetryableStatus, retry_count: usize) -> Option<Duration> {
        self.schedule(status).get(retry_count).copied()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            server_error: vec![
                Duration::from_millis(500),
                Duration::from_millis(1000),
                Duration::from_millis(2000),
            ],
            rate_limited: vec![
                Duration::from_secs(10),
                Duration::from_secs(25),
                Duration::from_secs(55),
            ],
        }
    }
}
