use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::{NotifierConfig, ProxyConfig};
use crate::errors::Result;
use crate::event::{AcknowledgeIncident, ChangeEvent, Event, ResolveIncident, TriggerIncident};
use crate::notifier::Notifier;
use crate::result::EventResult;
use crate::retry::RetryPolicy;

/// The four Events API operations
///
/// Implemented by [`EventsClient`] and by
/// [`FakeEventsClient`](crate::FakeEventsClient), so code under test can take
/// either.
#[async_trait]
pub trait EventsApi: Send + Sync {
    /// Open (or re-trigger) an incident
    async fn trigger(&self, incident: TriggerIncident) -> Result<EventResult>;

    async fn acknowledge(&self, ack: AcknowledgeIncident) -> Result<EventResult>;

    async fn resolve(&self, resolve: ResolveIncident) -> Result<EventResult>;

    /// Report an infrastructure change
    async fn track_change(&self, change: ChangeEvent) -> Result<EventResult>;
}

/// Client for the PagerDuty Events API
///
/// Only integration (routing) keys are needed, and they travel inside each
/// event; no account-level API key is required.
///
/// # Example
///
/// ```rust,no_run
/// use pagerduty_events::{EventsClient, Payload, Severity, TriggerIncident};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = EventsClient::builder().with_retries(true).build()?;
///
///     let payload = Payload::new("CPU above 90%", "web-1", Severity::Warning)?;
///     let incident = TriggerIncident::new("ROUTING_KEY", payload)?;
///
///     let result = client.trigger(incident).await?;
///     println!("{result}");
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct EventsClient {
    notifier: Notifier,
}

impl EventsClient {
    /// Client for the public endpoints, without proxy or retries
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> EventsClientBuilder {
        EventsClientBuilder::default()
    }

    /// Create a client around an existing notifier
    pub fn with_notifier(notifier: Notifier) -> Self {
        Self { notifier }
    }

    pub async fn trigger(&self, incident: TriggerIncident) -> Result<EventResult> {
        self.send(incident.into()).await
    }

    pub async fn acknowledge(&self, ack: AcknowledgeIncident) -> Result<EventResult> {
        self.send(ack.into()).await
    }

    pub async fn resolve(&self, resolve: ResolveIncident) -> Result<EventResult> {
        self.send(resolve.into()).await
    }

    pub async fn track_change(&self, change: ChangeEvent) -> Result<EventResult> {
        self.send(change.into()).await
    }

    /// Get the notifier requests go through
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    async fn send(&self, event: Event) -> Result<EventResult> {
        let result = self.notifier.notify(&event).await?;
        debug!(kind = event.kind(), result = %result, "Event result");
        Ok(result)
    }
}

#[async_trait]
impl EventsApi for EventsClient {
    async fn trigger(&self, incident: TriggerIncident) -> Result<EventResult> {
        EventsClient::trigger(self, incident).await
    }

    async fn acknowledge(&self, ack: AcknowledgeIncident) -> Result<EventResult> {
        EventsClient::acknowledge(self, ack).await
    }

    async fn resolve(&self, resolve: ResolveIncident) -> Result<EventResult> {
        EventsClient::resolve(self, resolve).await
    }

    async fn track_change(&self, change: ChangeEvent) -> Result<EventResult> {
        EventsClient::track_change(self, change).await
    }
}

/// Named construction options for [`EventsClient`]
///
/// Defaults: public PagerDuty endpoints, no proxy, retries off.
#[derive(Clone, Default)]
pub struct EventsClientBuilder {
    config: NotifierConfig,
    client: Option<ClientWithMiddleware>,
}

impl EventsClientBuilder {
    /// Override the trigger/acknowledge/resolve endpoint
    ///
    /// Meant for testing; real events should go to `events.pagerduty.com`.
    pub fn with_event_api(mut self, url: Url) -> Self {
        self.config.event_api = url;
        self
    }

    /// Override the change event endpoint
    pub fn with_change_event_api(mut self, url: Url) -> Self {
        self.config.change_event_api = url;
        self
    }

    /// Route every request through an HTTP proxy
    pub fn with_proxy(mut self, host: &str, port: u16) -> Self {
        self.config.proxy = Some(ProxyConfig::new(host, port));
        self
    }

    /// Retry 429 and 500 responses
    pub fn with_retries(mut self, do_retries: bool) -> Self {
        self.config.do_retries = do_retries;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.config.retry_policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Send `Authorization: Token token=<token>` with every request
    pub fn with_api_token(mut self, token: &str) -> Self {
        self.config.api_token = Some(token.to_string());
        self
    }

    /// Use a custom reqwest middleware client (timeout and proxy options are then ignored)
    pub fn with_http_client(mut self, client: ClientWithMiddleware) -> Self {
        self.client = Some(client);
        self
    }

    /// # Errors
    ///
    /// Returns an error if the proxy or API token is invalid or the HTTP
    /// client cannot be built.
    pub fn build(self) -> Result<EventsClient> {
        let notifier = match self.client {
            Some(client) => Notifier::with_client(client, self.config)?,
            None => Notifier::new(self.config)?,
        };
        Ok(EventsClient::with_notifier(notifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_CHANGE_EVENT_API, DEFAULT_EVENT_API};
    use crate::event::{ChangeEventPayload, Payload, Severity};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ROUTING_KEY: &str = "ROUTING_KEY";
    const DEDUP_KEY: &str = "DEDUP_KEY";

    fn client(mock_server: &MockServer) -> EventsClient {
        EventsClient::builder()
            .with_event_api(Url::parse(&format!("{}/v2/enqueue", mock_server.uri())).unwrap())
            .with_change_event_api(
                Url::parse(&format!("{}/v2/change/enqueue", mock_server.uri())).unwrap(),
            )
            .with_timeout(Duration::from_secs(10))
            .build()
            .unwrap()
    }

    async fn expect_action(mock_server: &MockServer, action: &str) {
        Mock::given(method("POST"))
            .and(path("/v2/enqueue"))
            .and(body_partial_json(json!({"event_action": action})))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({
                "status": "success",
                "message": "Event processed",
                "dedup_key": DEDUP_KEY
            })))
            .expect(1)
            .mount(mock_server)
            .await;
    }

    fn expected() -> EventResult {
        EventResult::success("success", "Event processed", Some(DEDUP_KEY))
    }

    #[tokio::test]
    async fn test_trigger() {
        let mock_server = MockServer::start().await;
        expect_action(&mock_server, "trigger").await;

        let payload = Payload::new("Test incident", "testing host", Severity::Info).unwrap();
        let incident = TriggerIncident::new(ROUTING_KEY, payload).unwrap();

        let result = client(&mock_server).trigger(incident).await.unwrap();
        assert_eq!(result, expected());
    }

    #[tokio::test]
    async fn test_acknowledge() {
        let mock_server = MockServer::start().await;
        expect_action(&mock_server, "acknowledge").await;

        let ack = AcknowledgeIncident::new(ROUTING_KEY, DEDUP_KEY).unwrap();
        let result = client(&mock_server).acknowledge(ack).await.unwrap();
        assert_eq!(result, expected());
    }

    #[tokio::test]
    async fn test_resolve() {
        let mock_server = MockServer::start().await;
        expect_action(&mock_server, "resolve").await;

        let resolve = ResolveIncident::new(ROUTING_KEY, DEDUP_KEY).unwrap();
        let result = client(&mock_server).resolve(resolve).await.unwrap();
        assert_eq!(result, expected());
    }

    #[tokio::test]
    async fn test_track_change() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/change/enqueue"))
            .and(body_partial_json(json!({"routing_key": ROUTING_KEY})))
            .respond_with(
                ResponseTemplate::new(202)
                    .set_body_json(json!({"status": "success", "message": "Change event processed"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let payload = ChangeEventPayload::new("Deployed v2").unwrap();
        let change = ChangeEvent::new(ROUTING_KEY, payload).unwrap();

        let result = client(&mock_server).track_change(change).await.unwrap();
        assert_eq!(
            result,
            EventResult::success("success", "Change event processed", None)
        );
    }

    #[tokio::test]
    async fn test_through_trait_object() {
        let mock_server = MockServer::start().await;
        expect_action(&mock_server, "resolve").await;

        let api: Box<dyn EventsApi> = Box::new(client(&mock_server));
        let resolve = ResolveIncident::new(ROUTING_KEY, DEDUP_KEY).unwrap();
        assert_eq!(api.resolve(resolve).await.unwrap(), expected());
    }

    #[test]
    fn test_default_client_configuration() {
        let client = EventsClient::new().unwrap();
        let config = client.notifier().config();

        assert_eq!(config.event_api.as_str(), DEFAULT_EVENT_API);
        assert_eq!(config.change_event_api.as_str(), DEFAULT_CHANGE_EVENT_API);
        assert!(config.proxy.is_none());
        assert!(!config.do_retries);
    }

    #[test]
    fn test_builder_options() {
        let event_api = Url::parse("http://localhost:8080/v2/enqueue").unwrap();
        let client = EventsClient::builder()
            .with_event_api(event_api.clone())
            .with_proxy("proxy.internal", 3128)
            .with_retries(true)
            .build()
            .unwrap();

        let expected = Notifier::new(NotifierConfig {
            event_api,
            proxy: Some(ProxyConfig::new("proxy.internal", 3128)),
            do_retries: true,
            ..NotifierConfig::default()
        })
        .unwrap();

        assert!(client.notifier() == &expected);
        assert_eq!(
            client.notifier().config().change_event_api.as_str(),
            DEFAULT_CHANGE_EVENT_API
        );
    }
}
