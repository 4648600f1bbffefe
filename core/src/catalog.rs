//! Metric catalog: metric id to canonical metric name.
//!
//! Built once per scoring run through `MetricCatalogBuilder`, then frozen.
//! The frozen catalog has no mutation API and is shared read-only
//! (behind an `Arc`) by every scoring invocation of the run.

use crate::types::MetricId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One entry of the platform's metrics listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricDescriptor {
    pub id:   MetricId,
    pub name: String,
}

#[derive(Debug, Default)]
pub struct MetricCatalogBuilder {
    names: HashMap<MetricId, String>,
}

impl MetricCatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later entries for the same id replace earlier ones.
    pub fn insert(mut self, id: impl Into<MetricId>, name: impl Into<String>) -> Self {
        self.names.insert(id.into(), name.into());
        self
    }

    pub fn extend<I>(mut self, descriptors: I) -> Self
    where
        I: IntoIterator<Item = MetricDescriptor>,
    {
        self.names
            .extend(descriptors.into_iter().map(|d| (d.id, d.name)));
        self
    }

    pub fn freeze(self) -> MetricCatalog {
        log::debug!("metric catalog frozen with {} metrics", self.names.len());
        MetricCatalog { names: self.names }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MetricCatalog {
    names: HashMap<MetricId, String>,
}

impl MetricCatalog {
    pub fn builder() -> MetricCatalogBuilder {
        MetricCatalogBuilder::new()
    }

    pub fn from_descriptors<I>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = MetricDescriptor>,
    {
        MetricCatalogBuilder::new().extend(descriptors).freeze()
    }

    /// Canonical name for a metric id, if the platform listed it.
    pub fn resolve(&self, metric_id: &str) -> Option<&str> {
        self.names.get(metric_id).map(String::as_str)
    }

    pub fn contains(&self, metric_id: &str) -> bool {
        self.names.contains_key(metric_id)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_listed_ids_only() {
        let catalog = MetricCatalog::builder()
            .insert("VMtmgm", "Opened Email")
            .insert("XzTeLQ", "Clicked Email")
            .freeze();

        assert_eq!(catalog.resolve("VMtmgm"), Some("Opened Email"));
        assert_eq!(catalog.resolve("nope"), None);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn later_descriptor_wins() {
        let catalog = MetricCatalog::from_descriptors(vec![
            MetricDescriptor { id: "a".into(), name: "Old".into() },
            MetricDescriptor { id: "a".into(), name: "New".into() },
        ]);
        assert_eq!(catalog.resolve("a"), Some("New"));
    }
}
