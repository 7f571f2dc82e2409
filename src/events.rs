//! Fire-and-forget structured event records for UI/telemetry consumers.
//!
//! The interaction layer emits an [`EventRecord`] per notable transition
//! (reset, episode load, grab/release outcomes) and never looks back; sinks
//! must not fail into the controller.

use serde::Serialize;
use serde_json::Value;
use std::time::SystemTime;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    pub category: String,
    pub name: String,
    pub payload: Value,
    #[serde(skip)]
    pub timestamp: SystemTime,
}

impl EventRecord {
    pub fn new(category: &str, name: &str, payload: Value) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            payload,
            timestamp: SystemTime::now(),
        }
    }
}

/// Consumer of event records. Implementations swallow their own failures.
pub trait EventSink {
    fn record(&mut self, event: EventRecord);
}

/// Sink that forwards events to the tracing pipeline.
#[derive(Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&mut self, event: EventRecord) {
        info!(
            target: "simgrip::events",
            category = %event.category,
            name = %event.name,
            payload = %event.payload,
            "event"
        );
    }
}

/// Sink that drops everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&mut self, _event: EventRecord) {}
}

/// Sink that keeps every record in memory; handy in tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub events: Vec<EventRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.name.as_str()).collect()
    }
}

impl EventSink for MemorySink {
    fn record(&mut self, event: EventRecord) {
        self.events.push(event);
    }
}

/// Cloneable handle over a [`MemorySink`], so a test can keep reading the
/// sink it handed to a session. The session model is single-threaded.
#[derive(Debug, Clone, Default)]
pub struct SharedMemorySink(pub std::rc::Rc<std::cell::RefCell<MemorySink>>);

impl SharedMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> Vec<String> {
        self.0
            .borrow()
            .events
            .iter()
            .map(|e| e.name.clone())
            .collect()
    }
}

impl EventSink for SharedMemorySink {
    fn record(&mut self, event: EventRecord) {
        self.0.borrow_mut().record(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn memory_sink_keeps_order() {
        let mut sink = MemorySink::new();
        sink.record(EventRecord::new("session", "simReset", json!({})));
        sink.record(EventRecord::new("session", "setEpisode", json!({"objects": 2})));
        assert_eq!(sink.names(), vec!["simReset", "setEpisode"]);
        assert_eq!(sink.events[1].payload["objects"], 2);
    }

    #[test]
    fn records_serialize_for_consumers() {
        let record = EventRecord::new("session", "grab", json!({"objectId": 3}));
        let serialized = serde_json::to_value(&record).unwrap();
        assert_eq!(serialized["name"], "grab");
        assert_eq!(serialized["payload"]["objectId"], 3);
    }
}
