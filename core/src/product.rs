//! Viewed-product aggregation. Raw counts only, no rate normalization.

use crate::{
    classifier::{MetricKind, TaggedEvent},
    engagement::latest,
    types::EpochMillis,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductMetrics {
    pub views:        u32,
    pub last_view_at: Option<EpochMillis>,
}

impl ProductMetrics {
    pub fn aggregate(events: &[&TaggedEvent<'_>]) -> Self {
        events
            .iter()
            .filter(|t| t.kind == MetricKind::ProductViewed)
            .fold(Self::default(), |acc, t| Self {
                views:        acc.views + 1,
                last_view_at: latest(acc.last_view_at, t.event.timestamp),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use serde_json::Map;

    #[test]
    fn counts_views_and_keeps_latest() {
        let events = vec![
            Event::new("v1", "m", 1_700_000_000_000_i64, Map::new()),
            Event::new("v2", "m", 1_700_000_900_000_i64, Map::new()),
            Event::new("o1", "m", 1_700_009_000_000_i64, Map::new()),
        ];
        let tagged = vec![
            TaggedEvent { event: &events[0], kind: MetricKind::ProductViewed },
            TaggedEvent { event: &events[1], kind: MetricKind::ProductViewed },
            TaggedEvent { event: &events[2], kind: MetricKind::EmailOpened },
        ];
        let refs: Vec<_> = tagged.iter().collect();

        let m = ProductMetrics::aggregate(&refs);
        assert_eq!(m.views, 2);
        assert_eq!(m.last_view_at, Some(1_700_000_900_000));
    }

    #[test]
    fn empty_window_has_no_views() {
        assert_eq!(ProductMetrics::aggregate(&[]), ProductMetrics::default());
    }
}
