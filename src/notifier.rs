use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::NotifierConfig;
use crate::errors::{EventsError, Result};
use crate::event::{Endpoint, Event};
use crate::response::{self, Classification};
use crate::result::EventResult;

const APPLICATION_JSON: &str = "application/json";

/// Sends events to the Events API and turns responses into [`EventResult`]s
///
/// 429 and 500 responses are retried with the configured [`RetryPolicy`]
/// when `do_retries` is set; every other status is final. Holds no per-call
/// state, so one notifier can serve concurrent callers.
///
/// [`RetryPolicy`]: crate::RetryPolicy
#[derive(Clone)]
pub struct Notifier {
    client: ClientWithMiddleware,
    config: NotifierConfig,
    authorization: Option<HeaderValue>,
}

impl Notifier {
    /// Build a notifier and its HTTP client from `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the proxy address is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: NotifierConfig) -> Result<Self> {
        let mut builder = Client::builder().timeout(config.timeout);

        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy.url()).map_err(EventsError::Proxy)?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(EventsError::BuildHttpClient)?;
        let client = ClientBuilder::new(client).build();

        Self::with_client(client, config)
    }

    /// Create a notifier with a custom reqwest middleware client
    ///
    /// The `timeout` and `proxy` settings of `config` are ignored; configure
    /// them on `client` instead.
    pub fn with_client(client: ClientWithMiddleware, config: NotifierConfig) -> Result<Self> {
        let authorization = config
            .api_token
            .as_deref()
            .map(|token| HeaderValue::from_str(&format!("Token token={token}")))
            .transpose()
            .map_err(EventsError::InvalidHeader)?;

        Ok(Self {
            client,
            config,
            authorization,
        })
    }

    /// Send `event` and classify the response
    ///
    /// # Errors
    ///
    /// Returns an error only when no HTTP response could be obtained
    /// (connection failure, timeout, unreadable body) or the event cannot be
    /// serialized. Rejections by PagerDuty are `Ok(EventResult::Error { .. })`.
    pub async fn notify(&self, event: &Event) -> Result<EventResult> {
        self.notify_inner(event, None).await
    }

    /// Like [`notify`](Self::notify), but cancelling `cancel` during a
    /// backoff stops retrying and returns the last retryable response as a
    /// terminal error.
    pub async fn notify_until_cancelled(
        &self,
        event: &Event,
        cancel: &CancellationToken,
    ) -> Result<EventResult> {
        self.notify_inner(event, Some(cancel)).await
    }

    #[instrument(
        name = "Notifier::notify",
        skip_all,
        fields(kind = event.kind(), endpoint = ?event.endpoint())
    )]
    async fn notify_inner(
        &self,
        event: &Event,
        cancel: Option<&CancellationToken>,
    ) -> Result<EventResult> {
        let url = self.endpoint_url(event.endpoint());
        let body = serde_json::to_vec(event).map_err(EventsError::Serialize)?;
        let mut retry_count = 0;

        loop {
            let (status, response_body) = self.send(url, &body).await?;

            let retryable = match response::classify(status, &response_body) {
                Classification::Done(result) => return Ok(result),
                Classification::Retryable(retryable) => retryable,
            };

            let terminal = response::unclassified(status, &response_body);
            if !self.config.do_retries {
                return Ok(terminal);
            }

            let Some(delay) = self.config.retry_policy.delay(retryable, retry_count) else {
                warn!(
                    status = status.as_u16(),
                    retries = retry_count,
                    "Retries exhausted"
                );
                return Ok(terminal);
            };

            debug!(
                status = status.as_u16(),
                retry = retry_count + 1,
                delay_ms = delay.as_millis() as u64,
                "Retrying event"
            );

            if !backoff(delay, cancel).await {
                debug!(retries = retry_count, "Retry cancelled during backoff");
                return Ok(terminal);
            }
            retry_count += 1;
        }
    }

    /// One POST; the body is fully buffered before it is logged or parsed
    async fn send(&self, url: &Url, body: &[u8]) -> Result<(StatusCode, Vec<u8>)> {
        let mut request = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .header(ACCEPT, APPLICATION_JSON)
            .body(body.to_vec());

        if let Some(authorization) = &self.authorization {
            request = request.header(AUTHORIZATION, authorization.clone());
        }

        let response = request.send().await.map_err(EventsError::Request)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(EventsError::ReadBody)?;

        debug!(
            status = status.as_u16(),
            body = %response::raw_text(&bytes),
            "Events API response"
        );

        Ok((status, bytes.to_vec()))
    }

    /// URL an event with the given endpoint is posted to
    pub fn endpoint_url(&self, endpoint: Endpoint) -> &Url {
        match endpoint {
            Endpoint::Events => &self.config.event_api,
            Endpoint::ChangeEvents => &self.config.change_event_api,
        }
    }

    /// Get the configuration this notifier was built from
    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }
}

/// Equal when endpoints, proxy and the retry flag match
impl PartialEq for Notifier {
    fn eq(&self, other: &Self) -> bool {
        self.config.event_api == other.config.event_api
            && self.config.change_event_api == other.config.change_event_api
            && self.config.proxy == other.config.proxy
            && self.config.do_retries == other.config.do_retries
    }
}

impl Eq for Notifier {}

/// Sleep for `delay`; `false` if `cancel` fired first
async fn backoff(delay: Duration, cancel: Option<&CancellationToken>) -> bool {
    match cancel {
        Some(cancel) => {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => false,
                _ = tokio::time::sleep(delay) => true,
            }
        }
        None => {
            tokio::time::sleep(delay).await;
            true
        }
    }
}
