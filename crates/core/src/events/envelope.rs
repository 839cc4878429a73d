// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The standardized event envelope

use crate::clock::{iso8601, Clock};
use crate::id::CorrelationIds;
use serde_json::{Map, Value};

/// Name of the channel that receives every standardized envelope
pub const GLOBAL_CHANNEL: &str = "event";

/// Keys owned by the envelope; payload values under these names are replaced
const ENVELOPE_KEYS: [&str; 5] = ["timestamp", "component", "action", "traceId", "requestId"];

/// `{ timestamp, component, action, traceId, requestId, ...payload }`
#[derive(Debug, Clone, PartialEq)]
pub struct StandardEnvelope {
    pub timestamp: String,
    pub component: String,
    pub action: String,
    pub trace_id: String,
    pub request_id: String,
    pub payload: Map<String, Value>,
}

impl StandardEnvelope {
    /// Stamp a payload. A `traceId`/`requestId` already present in the payload
    /// is kept; otherwise a fresh one is generated.
    pub fn build(
        clock: &dyn Clock,
        ids: &CorrelationIds,
        component: &str,
        action: &str,
        mut payload: Map<String, Value>,
    ) -> Self {
        let trace_id = take_string(&mut payload, "traceId").unwrap_or_else(|| ids.trace_id());
        let request_id =
            take_string(&mut payload, "requestId").unwrap_or_else(|| ids.request_id());
        for key in ENVELOPE_KEYS {
            payload.remove(key);
        }
        Self {
            timestamp: iso8601(&clock.now()),
            component: component.to_string(),
            action: action.to_string(),
            trace_id,
            request_id,
            payload,
        }
    }

    /// `component:action`
    pub fn name(&self) -> String {
        format!("{}:{}", self.component, self.action)
    }

    /// The flat JSON object delivered on the specific event name
    pub fn to_value(&self) -> Value {
        let mut object = self.payload.clone();
        object.insert("timestamp".into(), Value::String(self.timestamp.clone()));
        object.insert("component".into(), Value::String(self.component.clone()));
        object.insert("action".into(), Value::String(self.action.clone()));
        object.insert("traceId".into(), Value::String(self.trace_id.clone()));
        object.insert("requestId".into(), Value::String(self.request_id.clone()));
        Value::Object(object)
    }

    /// The same object with `type` added, delivered on the global channel
    pub fn to_global_value(&self) -> Value {
        let mut value = self.to_value();
        if let Value::Object(object) = &mut value {
            object.insert("type".into(), Value::String(self.name()));
        }
        value
    }

    /// Parse a delivered envelope back; `None` if a required field is missing
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let field = |key: &str| object.get(key)?.as_str().map(str::to_string);
        let mut payload = object.clone();
        for key in ENVELOPE_KEYS.iter().chain(std::iter::once(&"type")) {
            payload.remove(*key);
        }
        Some(Self {
            timestamp: field("timestamp")?,
            component: field("component")?,
            action: field("action")?,
            trace_id: field("traceId")?,
            request_id: field("requestId")?,
            payload,
        })
    }
}

fn take_string(payload: &mut Map<String, Value>, key: &str) -> Option<String> {
    match payload.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// One recorded emission
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct HistoryEntry {
    /// The event name as requested by the emitter
    pub event: String,
    pub payload: Value,
    pub recorded_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn build_generates_missing_correlation() {
        let clock = FakeClock::new();
        let ids = CorrelationIds::sequential();
        let envelope =
            StandardEnvelope::build(&clock, &ids, "task", "task_created", payload(json!({"id": "T001"})));

        assert_eq!(envelope.trace_id, "trace-1");
        assert_eq!(envelope.request_id, "req-1");
        assert_eq!(envelope.timestamp, "2026-01-01T00:00:00.000Z");
        assert_eq!(envelope.name(), "task:task_created");
    }

    #[test]
    fn build_keeps_supplied_correlation() {
        let clock = FakeClock::new();
        let ids = CorrelationIds::sequential();
        let envelope = StandardEnvelope::build(
            &clock,
            &ids,
            "task",
            "task_created",
            payload(json!({"traceId": "t0", "requestId": "r0", "component": "spoofed"})),
        );

        assert_eq!(envelope.trace_id, "t0");
        assert_eq!(envelope.request_id, "r0");
        let value = envelope.to_value();
        assert_eq!(value["component"], json!("task"));
    }

    #[test]
    fn global_value_adds_type() {
        let clock = FakeClock::new();
        let ids = CorrelationIds::sequential();
        let envelope = StandardEnvelope::build(&clock, &ids, "x", "y", payload(json!({"k": 1})));
        let global = envelope.to_global_value();

        assert_eq!(global["type"], json!("x:y"));
        assert_eq!(global["k"], json!(1));
        assert!(envelope.to_value().get("type").is_none());
    }

    #[test]
    fn from_value_inverts_to_value() {
        let clock = FakeClock::new();
        let ids = CorrelationIds::sequential();
        let envelope = StandardEnvelope::build(&clock, &ids, "x", "y", payload(json!({"k": 1})));
        let parsed = StandardEnvelope::from_value(&envelope.to_global_value()).unwrap();
        assert_eq!(parsed, envelope);
        assert!(StandardEnvelope::from_value(&json!({"k": 1})).is_none());
    }
}
