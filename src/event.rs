use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::fmt::{Display, Formatter};

use crate::errors::{EventsError, Result};

/// Perceived severity of the status an event describes
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Error,
    Warning,
    Info,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Incident lifecycle action carried in `event_action`
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EventAction {
    Trigger,
    Acknowledge,
    Resolve,
}

impl Display for EventAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::Trigger => write!(f, "trigger"),
            EventAction::Acknowledge => write!(f, "acknowledge"),
            EventAction::Resolve => write!(f, "resolve"),
        }
    }
}

/// Which configured Events API endpoint receives an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `/v2/enqueue`: trigger, acknowledge, resolve
    Events,
    /// `/v2/change/enqueue`: change events
    ChangeEvents,
}

/// Hyperlink attached to an incident or change event
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LinkContext {
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl LinkContext {
    pub fn new(href: &str) -> Self {
        Self {
            href: href.to_string(),
            text: None,
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }
}

/// Image attached to an incident. PagerDuty only renders images served over HTTPS.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ImageContext {
    pub src: String,
    /// Makes the image a clickable link
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

impl ImageContext {
    pub fn new(src: &str) -> Self {
        Self {
            src: src.to_string(),
            href: None,
            alt: None,
        }
    }

    pub fn with_href(mut self, href: &str) -> Self {
        self.href = Some(href.to_string());
        self
    }

    pub fn with_alt(mut self, alt: &str) -> Self {
        self.alt = Some(alt.to_string());
        self
    }
}

/// Body of a trigger event
///
/// # Example
///
/// ```rust
/// use pagerduty_events::{Payload, Severity};
///
/// let payload = Payload::new("Disk usage above 95%", "db-1.example.com", Severity::Critical)
///     .unwrap()
///     .with_component("postgres")
///     .with_group("storage");
/// ```
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Payload {
    /// Short text used for the titles of associated alerts
    pub summary: String,

    /// Affected system, preferably a hostname or FQDN
    pub source: String,

    pub severity: Severity,

    /// When the emitting tool detected the event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<FixedOffset>>,

    /// Component of the source responsible for the event, e.g. `mysql` or `eth0`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,

    /// Logical grouping of components, e.g. `app-stack`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// Class/type of the event, e.g. `ping failure`
    #[serde(rename = "class", skip_serializing_if = "Option::is_none")]
    pub event_class: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_details: Option<serde_json::Value>,
}

impl Payload {
    /// Create a payload, rejecting a blank summary or source
    pub fn new(summary: &str, source: &str, severity: Severity) -> Result<Self> {
        Ok(Self {
            summary: non_blank("summary", summary)?,
            source: non_blank("source", source)?,
            severity,
            timestamp: None,
            component: None,
            group: None,
            event_class: None,
            custom_details: None,
        })
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<FixedOffset>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_component(mut self, component: &str) -> Self {
        self.component = Some(component.to_string());
        self
    }

    pub fn with_group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }

    pub fn with_class(mut self, event_class: &str) -> Self {
        self.event_class = Some(event_class.to_string());
        self
    }

    pub fn with_custom_details(mut self, details: serde_json::Value) -> Self {
        self.custom_details = Some(details);
        self
    }
}

/// Event that opens (or re-triggers) an incident
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TriggerIncident {
    pub routing_key: String,
    event_action: EventAction,
    /// Left empty, PagerDuty generates one and returns it in the result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dedup_key: Option<String>,
    pub payload: Payload,
    /// Name of the monitoring client triggering the event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<LinkContext>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageContext>,
}

impl TriggerIncident {
    /// Create a trigger event for the service behind `routing_key`
    pub fn new(routing_key: &str, payload: Payload) -> Result<Self> {
        Ok(Self {
            routing_key: non_blank("routing_key", routing_key)?,
            event_action: EventAction::Trigger,
            dedup_key: None,
            payload,
            client: None,
            client_url: None,
            links: Vec::new(),
            images: Vec::new(),
        })
    }

    pub fn with_dedup_key(mut self, dedup_key: &str) -> Self {
        self.dedup_key = Some(dedup_key.to_string());
        self
    }

    pub fn with_client(mut self, client: &str) -> Self {
        self.client = Some(client.to_string());
        self
    }

    pub fn with_client_url(mut self, client_url: &str) -> Self {
        self.client_url = Some(client_url.to_string());
        self
    }

    pub fn with_link(mut self, link: LinkContext) -> Self {
        self.links.push(link);
        self
    }

    pub fn with_image(mut self, image: ImageContext) -> Self {
        self.images.push(image);
        self
    }
}

/// Event that acknowledges an open incident
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AcknowledgeIncident {
    pub routing_key: String,
    event_action: EventAction,
    pub dedup_key: String,
}

impl AcknowledgeIncident {
    pub fn new(routing_key: &str, dedup_key: &str) -> Result<Self> {
        Ok(Self {
            routing_key: non_blank("routing_key", routing_key)?,
            event_action: EventAction::Acknowledge,
            dedup_key: non_blank("dedup_key", dedup_key)?,
        })
    }
}

/// Event that resolves an incident
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResolveIncident {
    pub routing_key: String,
    event_action: EventAction,
    pub dedup_key: String,
}

impl ResolveIncident {
    pub fn new(routing_key: &str, dedup_key: &str) -> Result<Self> {
        Ok(Self {
            routing_key: non_blank("routing_key", routing_key)?,
            event_action: EventAction::Resolve,
            dedup_key: non_blank("dedup_key", dedup_key)?,
        })
    }
}

/// Body of a change event
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChangeEventPayload {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// When the change took place
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_details: Option<serde_json::Value>,
}

impl ChangeEventPayload {
    pub fn new(summary: &str) -> Result<Self> {
        Ok(Self {
            summary: non_blank("summary", summary)?,
            source: None,
            timestamp: None,
            custom_details: None,
        })
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<FixedOffset>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_custom_details(mut self, details: serde_json::Value) -> Self {
        self.custom_details = Some(details);
        self
    }
}

/// Infrastructure change (deploy, config push, ...) reported to a service
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChangeEvent {
    pub routing_key: String,
    pub payload: ChangeEventPayload,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<LinkContext>,
}

impl ChangeEvent {
    pub fn new(routing_key: &str, payload: ChangeEventPayload) -> Result<Self> {
        Ok(Self {
            routing_key: non_blank("routing_key", routing_key)?,
            payload,
            links: Vec::new(),
        })
    }

    pub fn with_link(mut self, link: LinkContext) -> Self {
        self.links.push(link);
        self
    }
}

/// Any event the Events API accepts
///
/// Serializes as the wrapped event's JSON body.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Event {
    Trigger(TriggerIncident),
    Acknowledge(AcknowledgeIncident),
    Resolve(ResolveIncident),
    Change(ChangeEvent),
}

impl Event {
    /// Endpoint this event must be posted to
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Event::Change(_) => Endpoint::ChangeEvents,
            Event::Trigger(_) | Event::Acknowledge(_) | Event::Resolve(_) => Endpoint::Events,
        }
    }

    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Trigger(_) => "trigger",
            Event::Acknowledge(_) => "acknowledge",
            Event::Resolve(_) => "resolve",
            Event::Change(_) => "change",
        }
    }

    pub fn routing_key(&self) -> &str {
        match self {
            Event::Trigger(e) => &e.routing_key,
            Event::Acknowledge(e) => &e.routing_key,
            Event::Resolve(e) => &e.routing_key,
            Event::Change(e) => &e.routing_key,
        }
    }

    /// Dedup key, when the event carries one (change events never do)
    pub fn dedup_key(&self) -> Option<&str> {
        match self {
            Event::Trigger(e) => e.dedup_key.as_deref(),
            Event::Acknowledge(e) => Some(&e.dedup_key),
            Event::Resolve(e) => Some(&e.dedup_key),
            Event::Change(_) => None,
        }
    }
}

impl From<TriggerIncident> for Event {
    fn from(event: TriggerIncident) -> Self {
        Event::Trigger(event)
    }
}

impl From<AcknowledgeIncident> for Event {
    fn from(event: AcknowledgeIncident) -> Self {
        Event::Acknowledge(event)
    }
}

impl From<ResolveIncident> for Event {
    fn from(event: ResolveIncident) -> Self {
        Event::Resolve(event)
    }
}

impl From<ChangeEvent> for Event {
    fn from(event: ChangeEvent) -> Self {
        Event::Change(event)
    }
}

fn non_blank(field: &'static str, value: &str) -> Result<String> {
    if value.trim().is_empty() {
        return Err(EventsError::blank(field));
    }
    Ok(value.to_string())
}
