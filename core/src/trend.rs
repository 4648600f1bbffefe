//! Engagement trend: open rate of the trailing window minus the open rate
//! of the adjacent, non-overlapping window before it.

use crate::{
    classifier::TaggedEvent,
    config::OpenRateMode,
    engagement::EngagementMetrics,
    types::{EpochMillis, WINDOW_DAYS},
    window::TimeWindow,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendEstimate {
    pub current_open_rate:  f64,
    pub baseline_open_rate: f64,
    /// Positive = improving, negative = declining.
    pub delta:              f64,
}

pub fn estimate(events: &[TaggedEvent<'_>], now: EpochMillis, mode: OpenRateMode) -> TrendEstimate {
    let current = TimeWindow::trailing_days(now, WINDOW_DAYS);
    let baseline = current.preceding();

    let current_open_rate = EngagementMetrics::aggregate(&current.filter(events), mode).open_rate;
    let baseline_open_rate = EngagementMetrics::aggregate(&baseline.filter(events), mode).open_rate;

    TrendEstimate {
        current_open_rate,
        baseline_open_rate,
        delta: current_open_rate - baseline_open_rate,
    }
}
