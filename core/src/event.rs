//! Canonical customer event.
//!
//! RULE: timestamps are normalized when an Event is constructed.
//! No code past this module looks at the raw encoding.

use crate::{
    timestamp::RawTimestamp,
    types::{EpochMillis, MetricId},
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One time-stamped platform event belonging to a single profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id:         String,
    pub metric_id:  MetricId,
    /// `None` when the raw timestamp could not be parsed. Deserialized
    /// values pass through the same normalization as `Event::new`.
    #[serde(default, deserialize_with = "normalized_timestamp")]
    pub timestamp:  Option<EpochMillis>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Event {
    pub fn new(
        id: impl Into<String>,
        metric_id: impl Into<MetricId>,
        timestamp: impl Into<RawTimestamp>,
        properties: Map<String, Value>,
    ) -> Self {
        Self {
            id:         id.into(),
            metric_id:  metric_id.into(),
            timestamp:  timestamp.into().normalize(),
            properties,
        }
    }

    /// Key used to deduplicate opens and clicks: the `campaign_id`
    /// property when present, otherwise the event's own id.
    pub fn campaign_key(&self) -> String {
        match self.properties.get("campaign_id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => self.id.clone(),
        }
    }

    /// Monetary amount of an order event (`value`, `$value`, then `total`).
    /// Numeric strings are accepted.
    pub fn monetary_value(&self) -> Option<f64> {
        ["value", "$value", "total"]
            .iter()
            .filter_map(|k| self.properties.get(*k))
            .find_map(as_amount)
    }

    /// Product names listed in `items` or `line_items`.
    pub fn product_names(&self) -> Vec<String> {
        let items = ["items", "line_items"]
            .iter()
            .find_map(|k| self.properties.get(*k).and_then(Value::as_array));

        let Some(items) = items else {
            return Vec::new();
        };

        items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Object(obj) => obj
                    .get("product_name")
                    .or_else(|| obj.get("name"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
                _ => None,
            })
            .filter(|name| !name.trim().is_empty())
            .collect()
    }
}

fn normalized_timestamp<'de, D>(deserializer: D) -> Result<Option<EpochMillis>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawTimestamp>::deserialize(deserializer)?.and_then(|raw| raw.normalize()))
}

fn as_amount(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_start_matches('$').parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}
