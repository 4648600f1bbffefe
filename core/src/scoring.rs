//! Risk scoring policies.
//!
//! Two production models exist and callers may depend on either:
//!   1. Engagement-weighted (continuous): weighted sum of rate, recency,
//!      trend, frequency and negative-action terms.
//!   2. Purchase-recency-weighted (bucketed): points for purchase recency,
//!      engagement rate, purchase shortfall, minus a high-value credit.
//!
//! Both return a breakdown of their terms so observers can see why a
//! score came out the way it did. Scores are integers hard-clamped to [0, 100].

use crate::{
    config::{ChurnThresholds, ScoringConfig, ScoringStrategy},
    features::CustomerFeatures,
};
use serde::{Deserialize, Serialize};

/// Recency (in days) at which the recency terms saturate.
pub const RECENCY_SATURATION_DAYS: f64 = 30.0;

/// Lifetime spend above which the purchase model grants its credit.
pub const HIGH_VALUE_SPEND: f64 = 1000.0;

const W_OPEN_RATE:       f64 = 0.20;
const W_CLICK_RATE:      f64 = 0.20;
const W_OPEN_RECENCY:    f64 = 0.20;
const W_PRODUCT_RECENCY: f64 = 0.20;
const W_NEGATIVE_TREND:  f64 = 0.10;
const W_OPEN_FREQUENCY:  f64 = 0.05;
const W_NEGATIVE_ACTION: f64 = 0.05;

// ── Breakdowns ───────────────────────────────────────────────────────────────

/// Contributions of each engagement-model term, as fractions of the
/// full scale (multiply by 100 for points).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementBreakdown {
    pub open_rate_component:       f64,
    pub click_rate_component:      f64,
    pub open_recency_component:    f64,
    pub product_recency_component: f64,
    pub trend_component:           f64,
    /// Non-positive: frequent openers are less at risk.
    pub frequency_credit:          f64,
    pub negative_action_component: f64,
    pub raw:                       f64,
    pub score:                     u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseBreakdown {
    pub purchase_recency_points: i32,
    pub engagement_points:       i32,
    pub shortfall_points:        i32,
    /// Non-positive: high-value customers are less at risk.
    pub high_value_credit:       i32,
    pub raw:                     i32,
    pub score:                   u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum RiskBreakdown {
    Engagement(EngagementBreakdown),
    Purchase(PurchaseBreakdown),
}

impl RiskBreakdown {
    pub fn score(&self) -> u8 {
        match self {
            RiskBreakdown::Engagement(b) => b.score,
            RiskBreakdown::Purchase(b) => b.score,
        }
    }

    pub fn strategy(&self) -> ScoringStrategy {
        match self {
            RiskBreakdown::Engagement(_) => ScoringStrategy::Engagement,
            RiskBreakdown::Purchase(_) => ScoringStrategy::Purchase,
        }
    }

    /// Name of the term contributing the most risk; "none" when no term
    /// contributes.
    pub fn primary_driver(&self) -> &'static str {
        let drivers: Vec<(&'static str, f64)> = match self {
            RiskBreakdown::Engagement(b) => vec![
                ("open_rate",       b.open_rate_component),
                ("click_rate",      b.click_rate_component),
                ("open_recency",    b.open_recency_component),
                ("product_recency", b.product_recency_component),
                ("declining_trend", b.trend_component),
                ("negative_action", b.negative_action_component),
            ],
            RiskBreakdown::Purchase(b) => vec![
                ("purchase_recency",   f64::from(b.purchase_recency_points)),
                ("low_engagement",     f64::from(b.engagement_points)),
                ("purchase_shortfall", f64::from(b.shortfall_points)),
            ],
        };

        drivers
            .into_iter()
            .filter(|(_, v)| *v > 0.0)
            .fold(None, |best: Option<(&'static str, f64)>, cur| match best {
                Some(b) if b.1 >= cur.1 => Some(b),
                _ => Some(cur),
            })
            .map(|(name, _)| name)
            .unwrap_or("none")
    }
}

// ── Policies ─────────────────────────────────────────────────────────────────

/// A risk model. Implementations are pure: same features, same breakdown.
pub trait RiskPolicy: Send + Sync {
    fn strategy(&self) -> ScoringStrategy;

    fn score(&self, features: &CustomerFeatures) -> RiskBreakdown;
}

/// Build the policy selected by the config.
pub fn policy_for(config: &ScoringConfig) -> Box<dyn RiskPolicy> {
    match config.scoring_strategy {
        ScoringStrategy::Engagement => Box::new(EngagementWeighted),
        ScoringStrategy::Purchase => Box::new(PurchaseRecency::new(config.churn_thresholds.clone())),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EngagementWeighted;

impl RiskPolicy for EngagementWeighted {
    fn strategy(&self) -> ScoringStrategy {
        ScoringStrategy::Engagement
    }

    fn score(&self, f: &CustomerFeatures) -> RiskBreakdown {
        let open_rate_component = W_OPEN_RATE * (1.0 - f.engagement.open_rate);
        let click_rate_component = W_CLICK_RATE * (1.0 - f.engagement.click_rate);
        let open_recency_component = W_OPEN_RECENCY * recency_fraction(f.days_since_last_open);
        let product_recency_component =
            W_PRODUCT_RECENCY * recency_fraction(f.days_since_last_product_view);

        let trend_component = if f.trend.delta < 0.0 {
            W_NEGATIVE_TREND * f.trend.delta.abs().min(1.0)
        } else {
            0.0
        };

        let frequency_credit = -W_OPEN_FREQUENCY * f.open_frequency.clamp(0.0, 1.0);
        let negative_action_component =
            W_NEGATIVE_ACTION * f.negative_action_rate_pct.clamp(0.0, 100.0) / 100.0;

        let raw = open_rate_component
            + click_rate_component
            + open_recency_component
            + product_recency_component
            + trend_component
            + frequency_credit
            + negative_action_component;

        RiskBreakdown::Engagement(EngagementBreakdown {
            open_rate_component,
            click_rate_component,
            open_recency_component,
            product_recency_component,
            trend_component,
            frequency_credit,
            negative_action_component,
            raw,
            score: to_score(raw.clamp(0.0, 1.0) * 100.0),
        })
    }
}

#[derive(Debug, Clone)]
pub struct PurchaseRecency {
    thresholds: ChurnThresholds,
}

impl PurchaseRecency {
    pub fn new(thresholds: ChurnThresholds) -> Self {
        Self { thresholds }
    }

    /// Anything past the churn threshold takes the top bucket, even when
    /// the threshold sits inside the 30/60-day ladder.
    fn recency_points(&self, days: i64) -> i32 {
        let days = days as f64;
        if days > self.thresholds.days_since_last_purchase {
            90
        } else if days <= 30.0 {
            0
        } else if days <= 60.0 {
            30
        } else {
            60
        }
    }

    fn engagement_points(&self, rate_pct: f64) -> i32 {
        if rate_pct > 50.0 {
            0
        } else if rate_pct >= self.thresholds.min_engagement_rate {
            20
        } else {
            40
        }
    }
}

impl RiskPolicy for PurchaseRecency {
    fn strategy(&self) -> ScoringStrategy {
        ScoringStrategy::Purchase
    }

    fn score(&self, f: &CustomerFeatures) -> RiskBreakdown {
        let purchase_recency_points = self.recency_points(f.days_since_last_purchase);
        let engagement_points = self.engagement_points(f.engagement_rate_pct);
        let shortfall_points = if f.purchases.purchase_count < f.expected_purchases { 20 } else { 0 };
        let high_value_credit = if f.purchases.total_spent > HIGH_VALUE_SPEND { -10 } else { 0 };

        let raw = purchase_recency_points + engagement_points + shortfall_points + high_value_credit;

        RiskBreakdown::Purchase(PurchaseBreakdown {
            purchase_recency_points,
            engagement_points,
            shortfall_points,
            high_value_credit,
            raw,
            score: raw.clamp(0, 100) as u8,
        })
    }
}

fn recency_fraction(days: i64) -> f64 {
    (days.max(0) as f64 / RECENCY_SATURATION_DAYS).min(1.0)
}

fn to_score(points: f64) -> u8 {
    if points.is_nan() {
        return 0;
    }
    points.clamp(0.0, 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NEVER_DAYS;

    fn engagement_features() -> CustomerFeatures {
        let mut f = CustomerFeatures::default();
        f.engagement.delivered = 10;
        f.engagement.unique_opens = 3;
        f.engagement.open_events = 3;
        f.engagement.open_rate = 0.1;
        f.engagement.click_rate = 0.0;
        f.days_since_last_open = 45;
        f.days_since_last_click = NEVER_DAYS;
        f.days_since_last_product_view = 10;
        f.days_since_last_purchase = NEVER_DAYS;
        f.open_frequency = 0.2;
        f
    }

    #[test]
    fn engagement_terms_add_up() {
        let RiskBreakdown::Engagement(b) = EngagementWeighted.score(&engagement_features()) else {
            panic!("engagement policy returned a purchase breakdown");
        };
        assert!((b.open_rate_component - 0.18).abs() < 1e-12);
        assert!((b.click_rate_component - 0.20).abs() < 1e-12);
        assert!((b.open_recency_component - 0.20).abs() < 1e-12);
        assert!((b.product_recency_component - 0.2 / 3.0).abs() < 1e-12);
        assert_eq!(b.trend_component, 0.0);
        assert!((b.frequency_credit + 0.01).abs() < 1e-12);
        assert_eq!(b.score, 64);
    }

    #[test]
    fn declining_trend_adds_risk_improving_does_not() {
        let mut f = engagement_features();
        let base = EngagementWeighted.score(&f).score();

        f.trend.delta = 0.5;
        assert_eq!(EngagementWeighted.score(&f).score(), base);

        f.trend.delta = -0.5;
        assert_eq!(EngagementWeighted.score(&f).score(), base + 5);
    }

    #[test]
    fn purchase_buckets() {
        let policy = PurchaseRecency::new(ChurnThresholds::default());
        assert_eq!(policy.recency_points(30), 0);
        assert_eq!(policy.recency_points(31), 30);
        assert_eq!(policy.recency_points(60), 30);
        assert_eq!(policy.recency_points(90), 60);
        assert_eq!(policy.recency_points(91), 90);
        assert_eq!(policy.engagement_points(50.1), 0);
        assert_eq!(policy.engagement_points(50.0), 20);
        assert_eq!(policy.engagement_points(20.0), 20);
        assert_eq!(policy.engagement_points(19.9), 40);
    }

    #[test]
    fn low_threshold_takes_top_bucket_and_agrees_with_signals() {
        let thresholds = ChurnThresholds { days_since_last_purchase: 45.0, ..ChurnThresholds::default() };
        let policy = PurchaseRecency::new(thresholds.clone());
        assert_eq!(policy.recency_points(30), 0);
        assert_eq!(policy.recency_points(45), 30);
        assert_eq!(policy.recency_points(46), 90);
        assert_eq!(policy.recency_points(50), 90);

        let mut f = CustomerFeatures::default();
        f.days_since_last_purchase = 50;
        f.engagement_rate_pct = 80.0;
        let RiskBreakdown::Purchase(b) = policy.score(&f) else {
            panic!("purchase policy returned an engagement breakdown");
        };
        assert_eq!(b.purchase_recency_points, 90);

        let signals = crate::signals::generate(&f, ScoringStrategy::Purchase, &thresholds);
        assert!(signals.contains(&"No purchase in 50 days".to_string()));
    }

    #[test]
    fn purchase_score_clamps_at_one_hundred() {
        let mut f = CustomerFeatures::default();
        f.days_since_last_purchase = 120;
        f.engagement_rate_pct = 65.0;
        f.purchases.purchase_count = 0;
        f.expected_purchases = 2;
        f.purchases.total_spent = 50.0;

        let RiskBreakdown::Purchase(b) = PurchaseRecency::new(ChurnThresholds::default()).score(&f) else {
            panic!("purchase policy returned an engagement breakdown");
        };
        assert_eq!(b.raw, 110);
        assert_eq!(b.score, 100);
    }

    #[test]
    fn high_value_credit_never_goes_below_zero() {
        let mut f = CustomerFeatures::default();
        f.days_since_last_purchase = 3;
        f.engagement_rate_pct = 80.0;
        f.purchases.total_spent = 5000.0;

        let b = PurchaseRecency::new(ChurnThresholds::default()).score(&f);
        assert_eq!(b.score(), 0);
        assert_eq!(b.primary_driver(), "none");
    }

    #[test]
    fn primary_driver_picks_largest_term() {
        let mut f = CustomerFeatures::default();
        f.days_since_last_purchase = NEVER_DAYS;
        f.engagement_rate_pct = 30.0;
        let b = PurchaseRecency::new(ChurnThresholds::default()).score(&f);
        assert_eq!(b.primary_driver(), "purchase_recency");
    }

    #[test]
    fn policy_for_follows_config() {
        let config = ScoringConfig::default().with_strategy(ScoringStrategy::Purchase);
        assert_eq!(policy_for(&config).strategy(), ScoringStrategy::Purchase);
        assert_eq!(policy_for(&ScoringConfig::default()).strategy(), ScoringStrategy::Engagement);
    }
}
