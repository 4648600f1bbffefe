//! Order aggregation: purchase count, lifetime spend, recency and the
//! most frequently ordered products.

use crate::{
    classifier::{MetricKind, TaggedEvent},
    engagement::latest,
    types::EpochMillis,
};
use serde::{Deserialize, Serialize};

pub const TOP_PRODUCT_COUNT: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PurchaseMetrics {
    pub purchase_count:   u32,
    pub total_spent:      f64,
    pub last_purchase_at: Option<EpochMillis>,
    pub top_products:     Vec<String>,
}

impl PurchaseMetrics {
    pub fn aggregate(events: &[&TaggedEvent<'_>]) -> Self {
        let mut metrics = Self::default();
        // (name, count) in order of first appearance
        let mut products: Vec<(String, u32)> = Vec::new();

        for tagged in events.iter().filter(|t| t.kind == MetricKind::OrderPlaced) {
            metrics.purchase_count += 1;
            metrics.total_spent += tagged.event.monetary_value().unwrap_or(0.0);
            metrics.last_purchase_at = latest(metrics.last_purchase_at, tagged.event.timestamp);

            for name in tagged.event.product_names() {
                match products.iter_mut().find(|(n, _)| *n == name) {
                    Some((_, count)) => *count += 1,
                    None => products.push((name, 1)),
                }
            }
        }

        // Stable sort keeps first-appearance order among equal counts.
        products.sort_by(|a, b| b.1.cmp(&a.1));
        metrics.top_products = products
            .into_iter()
            .take(TOP_PRODUCT_COUNT)
            .map(|(name, _)| name)
            .collect();

        metrics
    }
}
