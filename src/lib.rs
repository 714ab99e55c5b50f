//! # PagerDuty Events
//!
//! A Rust client library for the [PagerDuty Events API v2](https://developer.pagerduty.com/docs/events-api-v2/overview/).
//!
//! ## Features
//!
//! - Trigger, acknowledge and resolve incidents
//! - Report change events to their own endpoint
//! - Typed results: upstream rejections are values, not errors
//! - Optional retries for rate limiting (429) and server errors (500), each
//!   with its own backoff schedule
//! - HTTP proxy support
//! - [`FakeEventsClient`] for testing code that sends events
//!
//! ## Example
//!
//! ```rust,no_run
//! use pagerduty_events::{EventsClient, Payload, ResolveIncident, Severity, TriggerIncident};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EventsClient::builder().with_retries(true).build()?;
//!
//!     let payload = Payload::new("Memory usage above 90%", "web-1.example.com", Severity::Critical)?
//!         .with_component("api")
//!         .with_group("frontend");
//!     let incident = TriggerIncident::new("ROUTING_KEY", payload)?.with_dedup_key("web-1-memory");
//!
//!     let result = client.trigger(incident).await?;
//!     if let Some(dedup_key) = result.dedup_key() {
//!         client.resolve(ResolveIncident::new("ROUTING_KEY", dedup_key)?).await?;
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod errors;
mod event;
mod fake;
mod notifier;
mod response;
mod result;
mod retry;

pub use client::{EventsApi, EventsClient, EventsClientBuilder};
pub use config::{NotifierConfig, ProxyConfig, DEFAULT_CHANGE_EVENT_API, DEFAULT_EVENT_API};
pub use errors::{EventsError, Result};
pub use event::{
    AcknowledgeIncident, ChangeEvent, ChangeEventPayload, Endpoint, Event, EventAction,
    ImageContext, LinkContext, Payload, ResolveIncident, Severity, TriggerIncident,
};
pub use fake::FakeEventsClient;
pub use notifier::Notifier;
pub use result::EventResult;
pub use retry::{RetryPolicy, RetryableStatus};
pub use tokio_util::sync::CancellationToken;
