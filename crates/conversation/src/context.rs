//! Per-chat memory that survives across events.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::calendar::CalendarPick;

/// Key under which typed calendar records are stored.
pub const CALENDAR_KEY: &str = "__calendar";

/// Flat keys written by older deployments, folded into typed records on load.
const LEGACY_PICKING_PREFIX: &str = "picking:";
const LEGACY_PICKED_PREFIX: &str = "picked:";

/// Context of one chat.
///
/// Free-form keys live at the top level of the serialized object; calendar
/// pickers are typed records under [`CALENDAR_KEY`], keyed by message id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatContext {
    #[serde(
        rename = "__calendar",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    calendars: BTreeMap<String, CalendarPick>,

    #[serde(flatten)]
    memory: Map<String, Value>,
}

impl ChatContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a stored context, folding legacy picker keys.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        let mut context: Self = serde_json::from_value(value)?;
        context.fold_legacy_keys();
        Ok(context)
    }

    /// Decode a stored JSON document.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Encode for storage.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    /// Whether nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.calendars.is_empty() && self.memory.is_empty()
    }

    /// Look up a free-form key. Unknown keys are `None`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.memory.get(key)
    }

    /// Free-form keys.
    pub fn memory(&self) -> &Map<String, Value> {
        &self.memory
    }

    /// Merge free-form keys, overwriting existing ones.
    ///
    /// The reserved calendar key cannot be written this way.
    pub fn merge(&mut self, partial: Map<String, Value>) {
        for (key, value) in partial {
            if key == CALENDAR_KEY {
                warn!("Ignoring write to reserved context key {}", CALENDAR_KEY);
                continue;
            }
            self.memory.insert(key, value);
        }
    }

    /// Picker attached to a message.
    pub fn calendar(&self, message_id: i64) -> Option<&CalendarPick> {
        self.calendars.get(&message_id.to_string())
    }

    /// Store the picker attached to a message.
    pub fn set_calendar(&mut self, message_id: i64, pick: CalendarPick) {
        self.calendars.insert(message_id.to_string(), pick);
    }

    /// Number of pickers in this chat.
    pub fn calendar_count(&self) -> usize {
        self.calendars.len()
    }

    fn fold_legacy_keys(&mut self) {
        let legacy: Vec<String> = self
            .memory
            .keys()
            .filter(|k| k.starts_with(LEGACY_PICKING_PREFIX) || k.starts_with(LEGACY_PICKED_PREFIX))
            .cloned()
            .collect();

        for key in legacy {
            let Some(value) = self.memory.remove(&key) else {
                continue;
            };

            if let Some(id) = key.strip_prefix(LEGACY_PICKING_PREFIX) {
                let pick = self.calendars.entry(id.to_string()).or_default();
                pick.picking = value.as_bool().unwrap_or(false);
            } else if let Some(id) = key.strip_prefix(LEGACY_PICKED_PREFIX) {
                let field = |name: &str| value.get(name).and_then(Value::as_str).map(String::from);
                let pick = self.calendars.entry(id.to_string()).or_default();
                pick.year = field("year");
                pick.month = field("month");
                pick.day = field("day");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_key_is_absent() {
        let context = ChatContext::new();
        assert!(context.get("previous_message").is_none());
        assert!(context.calendar(42).is_none());
        assert!(context.is_empty());
    }

    #[test]
    fn test_merge_overwrites() {
        let mut context = ChatContext::new();
        let mut partial = Map::new();
        partial.insert("previous_message".into(), json!("hello"));
        context.merge(partial);

        let mut partial = Map::new();
        partial.insert("previous_message".into(), json!("again"));
        partial.insert("counter".into(), json!(2));
        context.merge(partial);

        assert_eq!(context.get("previous_message"), Some(&json!("again")));
        assert_eq!(context.get("counter"), Some(&json!(2)));
    }

    #[test]
    fn test_merge_ignores_reserved_key() {
        let mut context = ChatContext::new();
        let mut partial = Map::new();
        partial.insert(CALENDAR_KEY.into(), json!({"1": {"picking": true}}));
        context.merge(partial);

        assert!(context.is_empty());
    }

    #[test]
    fn test_serialized_layout() {
        let mut context = ChatContext::new();
        let mut partial = Map::new();
        partial.insert("previous_message".into(), json!("hi"));
        context.merge(partial);
        context.set_calendar(42, CalendarPick::started());

        let value = context.to_value().unwrap();
        assert_eq!(
            value,
            json!({
                "previous_message": "hi",
                "__calendar": {"42": {"picking": true}}
            })
        );

        let decoded = ChatContext::from_value(value).unwrap();
        assert_eq!(decoded, context);
    }

    #[test]
    fn test_legacy_keys_are_folded() {
        let stored = json!({
            "previous_message": "hi",
            "picking:42": true,
            "picked:42": {"year": "2025", "month": "3"},
            "picked:7": {"year": "2024", "month": "1", "day": "2"}
        });

        let context = ChatContext::from_value(stored).unwrap();
        assert_eq!(context.memory().len(), 1);
        assert_eq!(context.calendar_count(), 2);

        let active = context.calendar(42).unwrap();
        assert!(active.picking);
        assert_eq!(active.month.as_deref(), Some("3"));
        assert!(active.day.is_none());

        let done = context.calendar(7).unwrap();
        assert!(done.is_finished());
    }
}
