//! Wire shapes of the marketing platform's JSON:API documents and their
//! conversion into engine types.
//!
//! Only the fields the engine reads are modelled; everything else in a
//! document is ignored.

use crate::{
    catalog::{MetricCatalog, MetricDescriptor},
    customer::Profile,
    event::Event,
    timestamp::RawTimestamp,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

/// A listing, either wrapped in the `{ "data": [...] }` envelope or bare.
/// An object without `data` (such as an `{ "errors": [...] }` body) is
/// not a listing and fails to parse.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Document<T> {
    Envelope { data: Vec<T> },
    Bare(Vec<T>),
}

impl<T> Document<T> {
    pub fn into_data(self) -> Vec<T> {
        match self {
            Document::Envelope { data } => data,
            Document::Bare(data) => data,
        }
    }
}

pub fn parse_document<T: DeserializeOwned>(content: &str) -> serde_json::Result<Vec<T>> {
    serde_json::from_str::<Document<T>>(content).map(Document::into_data)
}

/// Read and parse a listing file.
pub fn load_document<T: DeserializeOwned>(path: &str) -> anyhow::Result<Vec<T>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
    parse_document(&content).map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))
}

// ── Profiles ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileAttributes {
    pub email:      Option<String>,
    pub first_name: Option<String>,
    pub last_name:  Option<String>,
    pub created:    Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformProfile {
    pub id:         String,
    #[serde(default)]
    pub attributes: ProfileAttributes,
}

impl From<PlatformProfile> for Profile {
    fn from(p: PlatformProfile) -> Self {
        let created_at = p
            .attributes
            .created
            .as_deref()
            .and_then(|c| RawTimestamp::from(c).normalize());
        Profile {
            id:         p.id,
            email:      p.attributes.email,
            first_name: p.attributes.first_name,
            last_name:  p.attributes.last_name,
            created_at,
        }
    }
}

// ── Events ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventAttributes {
    pub timestamp:        Option<RawTimestamp>,
    pub datetime:         Option<String>,
    #[serde(default)]
    pub event_properties: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRef {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub id:   String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub data: Option<ResourceRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventRelationships {
    pub metric:  Option<Relationship>,
    pub profile: Option<Relationship>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    pub id:            String,
    #[serde(default)]
    pub attributes:    EventAttributes,
    #[serde(default)]
    pub relationships: Option<EventRelationships>,
}

impl PlatformEvent {
    pub fn metric_id(&self) -> Option<&str> {
        self.relationships
            .as_ref()?
            .metric
            .as_ref()?
            .data
            .as_ref()
            .map(|r| r.id.as_str())
    }
}

impl From<PlatformEvent> for Event {
    /// The numeric `timestamp` wins over `datetime` text. An event with
    /// neither keeps no timestamp; one with no metric keeps an empty id,
    /// which no catalog lists.
    fn from(e: PlatformEvent) -> Self {
        let metric_id = e.metric_id().unwrap_or_default().to_string();
        let timestamp = e
            .attributes
            .timestamp
            .as_ref()
            .and_then(RawTimestamp::normalize)
            .or_else(|| {
                e.attributes
                    .datetime
                    .as_deref()
                    .and_then(|d| RawTimestamp::from(d).normalize())
            });

        Event {
            id: e.id,
            metric_id,
            timestamp,
            properties: e.attributes.event_properties,
        }
    }
}

// ── Metrics ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricAttributes {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformMetric {
    pub id:         String,
    #[serde(default)]
    pub attributes: MetricAttributes,
}

impl From<PlatformMetric> for MetricDescriptor {
    fn from(m: PlatformMetric) -> Self {
        MetricDescriptor { id: m.id, name: m.attributes.name }
    }
}

pub fn catalog_from_metrics(metrics: Vec<PlatformMetric>) -> MetricCatalog {
    MetricCatalog::from_descriptors(metrics.into_iter().map(MetricDescriptor::from))
}
