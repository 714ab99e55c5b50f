use std::time::Duration;
use url::Url;

use crate::retry::RetryPolicy;

/// Public Events API endpoint for trigger/acknowledge/resolve
pub const DEFAULT_EVENT_API: &str = "https://events.pagerduty.com/v2/enqueue";

/// Public Events API endpoint for change events
pub const DEFAULT_CHANGE_EVENT_API: &str = "https://events.pagerduty.com/v2/change/enqueue";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP proxy every request is routed through
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
}

impl ProxyConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
        }
    }

    /// Proxy address in the form reqwest expects
    pub fn url(&self) -> String {
        if self.host.contains("://") {
            format!("{}:{}", self.host, self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }
}

/// Everything a [`Notifier`](crate::Notifier) is built from
///
/// Fixed once the notifier exists.
#[derive(Debug, Clone, PartialEq)]
pub struct NotifierConfig {
    /// Receives trigger, acknowledge and resolve events
    pub event_api: Url,
    /// Receives change events
    pub change_event_api: Url,
    pub proxy: Option<ProxyConfig>,
    /// Retry 429 and 500 responses according to `retry_policy`
    pub do_retries: bool,
    pub retry_policy: RetryPolicy,
    /// Per-request timeout
    pub timeout: Duration,
    /// Sent as `Authorization: Token token=<key>` when set
    pub api_token: Option<String>,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            event_api: default_url(DEFAULT_EVENT_API),
            change_event_api: default_url(DEFAULT_CHANGE_EVENT_API),
            proxy: None,
            do_retries: false,
            retry_policy: RetryPolicy::default(),
            timeout: DEFAULT_TIMEOUT,
            api_token: None,
        }
    }
}

fn default_url(url: &str) -> Url {
    Url::parse(url).expect("default endpoint is a valid URL")
}
