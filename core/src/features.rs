//! Feature extraction: everything the risk policies and signal rules read.
//!
//! Windows used:
//!   - trailing 30 days: delivered / opens / clicks / rates / product views
//!   - previous 30 days: trend baseline (see trend.rs)
//!   - all time:         recency of opens, clicks, views and purchases,
//!                       negative actions, purchase history

use crate::{
    classifier::{MetricKind, TaggedEvent},
    config::ScoringConfig,
    engagement::EngagementMetrics,
    product::ProductMetrics,
    purchase::PurchaseMetrics,
    trend::{self, TrendEstimate},
    types::{days_since, EpochMillis, WINDOW_DAYS},
    window::TimeWindow,
};
use serde::{Deserialize, Serialize};

/// Average opens per campaign at which the frequency credit saturates.
pub const MAX_EXPECTED_OPENS: f64 = 5.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerFeatures {
    pub engagement:                   EngagementMetrics,
    pub product:                      ProductMetrics,
    pub purchases:                    PurchaseMetrics,
    pub trend:                        TrendEstimate,
    pub days_since_last_open:         i64,
    pub days_since_last_click:        i64,
    pub days_since_last_product_view: i64,
    pub days_since_last_purchase:     i64,
    pub negative_actions:             u32,
    /// Negative actions per delivered email, percent, capped at 100.
    pub negative_action_rate_pct:     f64,
    /// `min(avg opens per campaign / 5, 1)`.
    pub open_frequency:               f64,
    /// (opens + clicks) / delivered, percent, capped at 100.
    pub engagement_rate_pct:          f64,
    pub account_age_days:             i64,
    pub expected_purchases:           u32,
}

impl CustomerFeatures {
    pub fn extract(
        tagged: &[TaggedEvent<'_>],
        account_created_at: Option<EpochMillis>,
        now: EpochMillis,
        config: &ScoringConfig,
    ) -> Self {
        let mode = config.open_rate_mode;
        let current = TimeWindow::trailing_days(now, WINDOW_DAYS).filter(tagged);
        let history = TimeWindow::all_time().filter(tagged);

        let engagement = EngagementMetrics::aggregate(&current, mode);
        let product = ProductMetrics::aggregate(&current);
        let purchases = PurchaseMetrics::aggregate(&history);
        let all_time_engagement = EngagementMetrics::aggregate(&history, mode);
        let all_time_product = ProductMetrics::aggregate(&history);
        let trend = trend::estimate(tagged, now, mode);

        let negative_actions = history
            .iter()
            .filter(|t| t.kind == MetricKind::NegativeAction)
            .count() as u32;
        let negative_action_rate_pct = if engagement.delivered > 0 {
            (f64::from(negative_actions) / f64::from(engagement.delivered) * 100.0).min(100.0)
        } else {
            0.0
        };

        let account_age_days = account_created_at
            .map(|created| days_since(Some(created), now))
            .unwrap_or(0);
        let expected_purchases =
            (account_age_days as f64 / config.churn_thresholds.min_purchase_frequency).floor() as u32;

        Self {
            days_since_last_open: days_since(all_time_engagement.last_open_at, now),
            days_since_last_click: days_since(all_time_engagement.last_click_at, now),
            days_since_last_product_view: days_since(all_time_product.last_view_at, now),
            days_since_last_purchase: days_since(purchases.last_purchase_at, now),
            negative_actions,
            negative_action_rate_pct,
            open_frequency: (engagement.avg_opens_per_campaign() / MAX_EXPECTED_OPENS).min(1.0),
            engagement_rate_pct: engagement.engagement_rate_pct(),
            account_age_days,
            expected_purchases,
            engagement,
            product,
            purchases,
            trend,
        }
    }
}
