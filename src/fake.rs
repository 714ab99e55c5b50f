//! In-memory stand-in for [`EventsClient`](crate::EventsClient) for caller-side tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::client::EventsApi;
use crate::errors::Result;
use crate::event::{AcknowledgeIncident, ChangeEvent, ResolveIncident, TriggerIncident};
use crate::result::EventResult;

#[derive(Debug, Default)]
struct Recorded {
    /// Triggers with the dedup key they were answered with
    triggered: Vec<(String, TriggerIncident)>,
    acknowledged: Vec<AcknowledgeIncident>,
    resolved: Vec<ResolveIncident>,
    changes: Vec<ChangeEvent>,
}

/// Records events instead of sending them and answers every call with success
///
/// Triggers without a dedup key get a generated one, the way PagerDuty does.
#[derive(Debug, Default)]
pub struct FakeEventsClient {
    recorded: Mutex<Recorded>,
}

impl FakeEventsClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Triggered incidents not resolved since
    pub fn open_incidents(&self) -> Vec<TriggerIncident> {
        let recorded = self.recorded.lock();
        recorded
            .triggered
            .iter()
            .filter(|(key, _)| !recorded.resolved.iter().any(|r| &r.dedup_key == key))
            .map(|(_, incident)| incident.clone())
            .collect()
    }

    pub fn acknowledged_incidents(&self) -> Vec<AcknowledgeIncident> {
        self.recorded.lock().acknowledged.clone()
    }

    pub fn resolved_incidents(&self) -> Vec<ResolveIncident> {
        self.recorded.lock().resolved.clone()
    }

    pub fn change_events(&self) -> Vec<ChangeEvent> {
        self.recorded.lock().changes.clone()
    }

    fn processed(action: &str, dedup_key: Option<&str>) -> EventResult {
        let result = EventResult::success(&format!("success-{action}"), "Event processed", dedup_key);
        debug!(result = %result, "Fake event result");
        result
    }
}

#[async_trait]
impl EventsApi for FakeEventsClient {
    async fn trigger(&self, incident: TriggerIncident) -> Result<EventResult> {
        let dedup_key = incident
            .dedup_key
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let result = Self::processed("trigger", Some(&dedup_key));
        self.recorded.lock().triggered.push((dedup_key, incident));
        Ok(result)
    }

    async fn acknowledge(&self, ack: AcknowledgeIncident) -> Result<EventResult> {
        let result = Self::processed("acknowledge", Some(&ack.dedup_key));
        self.recorded.lock().acknowledged.push(ack);
        Ok(result)
    }

    async fn resolve(&self, resolve: ResolveIncident) -> Result<EventResult> {
        let result = Self::processed("resolve", Some(&resolve.dedup_key));
        self.recorded.lock().resolved.push(resolve);
        Ok(result)
    }

    async fn track_change(&self, change: ChangeEvent) -> Result<EventResult> {
        let result = Self::processed("change", None);
        self.recorded.lock().changes.push(change);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{ChangeEventPayload, Payload, Severity};

    const ROUTING_KEY: &str = "ROUTING_KEY";
    const DEDUP_KEY: &str = "DedupKey";

    fn trigger() -> TriggerIncident {
        let payload = Payload::new(
            "This is an incident test",
            "testing host",
            Severity::Info,
        )
        .unwrap();
        TriggerIncident::new(ROUTING_KEY, payload).unwrap()
    }

    #[tokio::test]
    async fn test_trigger_incident() {
        let fake = FakeEventsClient::new();
        let result = fake.trigger(trigger()).await.unwrap();

        assert!(result.is_success());
        assert!(result.dedup_key().is_some());
        assert_eq!(fake.open_incidents().len(), 1);
    }

    #[tokio::test]
    async fn test_trigger_incident_with_dedup_key() {
        let fake = FakeEventsClient::new();
        let incident = trigger().with_dedup_key(DEDUP_KEY);

        let result = fake.trigger(incident.clone()).await.unwrap();

        assert_eq!(
            result,
            EventResult::success("success-trigger", "Event processed", Some(DEDUP_KEY))
        );
        assert_eq!(fake.open_incidents(), vec![incident]);
    }

    #[tokio::test]
    async fn test_acknowledge_incident() {
        let fake = FakeEventsClient::new();
        let ack = AcknowledgeIncident::new(ROUTING_KEY, DEDUP_KEY).unwrap();

        fake.acknowledge(ack.clone()).await.unwrap();
        assert_eq!(fake.acknowledged_incidents(), vec![ack]);
    }

    #[tokio::test]
    async fn test_trigger_and_resolve_incident() {
        let fake = FakeEventsClient::new();
        let result = fake.trigger(trigger()).await.unwrap();
        let dedup_key = result.dedup_key().unwrap();

        let resolve = ResolveIncident::new(ROUTING_KEY, dedup_key).unwrap();
        fake.resolve(resolve.clone()).await.unwrap();

        assert_eq!(fake.resolved_incidents(), vec![resolve]);
        assert!(fake.open_incidents().is_empty());
    }

    #[tokio::test]
    async fn test_track_change() {
        let fake = FakeEventsClient::new();
        let change = ChangeEvent::new(ROUTING_KEY, ChangeEventPayload::new("deploy").unwrap())
            .unwrap();

        let result = fake.track_change(change.clone()).await.unwrap();
        assert_eq!(result.dedup_key(), None);
        assert_eq!(fake.change_events(), vec![change]);
    }
}
