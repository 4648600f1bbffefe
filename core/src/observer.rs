//! Scoring observers.
//!
//! RULE: scoring functions never perform I/O. Intermediate values are
//! handed to an injected observer instead; the default one forwards
//! them to the `log` facade.

use crate::{customer::Customer, features::CustomerFeatures, scoring::RiskBreakdown};

/// Receives intermediate values of one scoring call, in pipeline order.
/// Every hook defaults to a no-op.
pub trait ScoringObserver: Send + Sync {
    fn on_features(&self, _profile_id: &str, _features: &CustomerFeatures) {}

    fn on_risk(&self, _profile_id: &str, _breakdown: &RiskBreakdown) {}

    fn on_scored(&self, _customer: &Customer) {}
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ScoringObserver for NoopObserver {}

/// Writes intermediates at debug level and the final score at trace level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl ScoringObserver for LogObserver {
    fn on_features(&self, profile_id: &str, f: &CustomerFeatures) {
        let e = &f.engagement;
        log::debug!(
            "profile={profile_id} engagement: delivered={} unique_opens={} unique_clicks={} \
             open_rate={:.3} click_rate={:.3} views_30d={}",
            e.delivered, e.unique_opens, e.unique_clicks, e.open_rate, e.click_rate, f.product.views,
        );
        log::debug!(
            "profile={profile_id} trend: current={:.3} baseline={:.3} delta={:+.3}",
            f.trend.current_open_rate, f.trend.baseline_open_rate, f.trend.delta,
        );
        log::debug!(
            "profile={profile_id} recency: open={}d click={}d view={}d purchase={}d \
             negative_actions={} open_frequency={:.2}",
            f.days_since_last_open,
            f.days_since_last_click,
            f.days_since_last_product_view,
            f.days_since_last_purchase,
            f.negative_actions,
            f.open_frequency,
        );
    }

    fn on_risk(&self, profile_id: &str, breakdown: &RiskBreakdown) {
        match breakdown {
            RiskBreakdown::Engagement(b) => log::debug!(
                "profile={profile_id} risk(engagement): open={:.1} click={:.1} open_recency={:.1} \
                 view_recency={:.1} trend={:.1} frequency={:.1} negative={:.2} => {}",
                b.open_rate_component * 100.0,
                b.click_rate_component * 100.0,
                b.open_recency_component * 100.0,
                b.product_recency_component * 100.0,
                b.trend_component * 100.0,
                b.frequency_credit * 100.0,
                b.negative_action_component * 100.0,
                b.score,
            ),
            RiskBreakdown::Purchase(b) => log::debug!(
                "profile={profile_id} risk(purchase): recency={} engagement={} shortfall={} \
                 high_value={} raw={} => {}",
                b.purchase_recency_points,
                b.engagement_points,
                b.shortfall_points,
                b.high_value_credit,
                b.raw,
                b.score,
            ),
        }
    }

    fn on_scored(&self, customer: &Customer) {
        log::trace!(
            "profile={} scored {} ({:?}), {} signals",
            customer.id,
            customer.risk_score,
            customer.risk_tier,
            customer.churn_signals.len(),
        );
    }
}
