//! Engagement aggregation over a window of tagged events.
//!
//! Opens and clicks are deduplicated per campaign (`Event::campaign_key`),
//! so repeated opens of one email count once. Rates are 0 when nothing
//! was delivered in the window.

use crate::{
    classifier::{MetricKind, TaggedEvent},
    config::OpenRateMode,
    types::EpochMillis,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngagementMetrics {
    pub delivered:     u32,
    pub unique_opens:  u32,
    pub unique_clicks: u32,
    /// Raw open events, before deduplication.
    pub open_events:   u32,
    pub open_rate:     f64,
    pub click_rate:    f64,
    pub last_open_at:  Option<EpochMillis>,
    pub last_click_at: Option<EpochMillis>,
}

impl EngagementMetrics {
    pub fn aggregate(events: &[&TaggedEvent<'_>], mode: OpenRateMode) -> Self {
        let mut delivered = 0u32;
        let mut open_events = 0u32;
        let mut opens: HashSet<String> = HashSet::new();
        let mut clicks: HashSet<String> = HashSet::new();
        let mut last_open_at: Option<EpochMillis> = None;
        let mut last_click_at: Option<EpochMillis> = None;

        for tagged in events {
            let ts = tagged.event.timestamp;
            match tagged.kind {
                MetricKind::EmailReceived => delivered += 1,
                MetricKind::EmailOpened => {
                    open_events += 1;
                    opens.insert(tagged.event.campaign_key());
                    last_open_at = latest(last_open_at, ts);
                }
                MetricKind::EmailClicked => {
                    clicks.insert(tagged.event.campaign_key());
                    last_click_at = latest(last_click_at, ts);
                }
                _ => {}
            }
        }

        let unique_opens = opens.len() as u32;
        let unique_clicks = clicks.len() as u32;

        Self {
            delivered,
            unique_opens,
            unique_clicks,
            open_events,
            open_rate: rate(unique_opens, delivered, mode),
            click_rate: rate(unique_clicks, delivered, mode),
            last_open_at,
            last_click_at,
        }
    }

    /// Mean open events per distinct campaign opened; 0 with no opens.
    pub fn avg_opens_per_campaign(&self) -> f64 {
        if self.unique_opens == 0 {
            0.0
        } else {
            f64::from(self.open_events) / f64::from(self.unique_opens)
        }
    }

    /// `(unique opens + unique clicks) / delivered` as a percentage,
    /// capped at 100.
    pub fn engagement_rate_pct(&self) -> f64 {
        if self.delivered == 0 {
            return 0.0;
        }
        let engaged = f64::from(self.unique_opens) + f64::from(self.unique_clicks);
        (engaged / f64::from(self.delivered) * 100.0).min(100.0)
    }
}

/// Rate of `unique` over `delivered` under the given mode. Always in [0, 1].
pub fn rate(unique: u32, delivered: u32, mode: OpenRateMode) -> f64 {
    if delivered == 0 {
        return 0.0;
    }
    let numerator = match mode {
        OpenRateMode::Capped => unique.min(1),
        OpenRateMode::Ratio => unique,
    };
    (f64::from(numerator) / f64::from(delivered)).min(1.0)
}

pub(crate) fn latest(current: Option<EpochMillis>, ts: Option<EpochMillis>) -> Option<EpochMillis> {
    match (current, ts) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}
