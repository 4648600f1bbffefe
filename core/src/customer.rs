//! Customer assembly: the immutable record every scoring call produces.

use crate::{
    config::ScoringStrategy,
    engagement::EngagementMetrics,
    features::CustomerFeatures,
    portfolio::RiskTier,
    scoring::RiskBreakdown,
    types::{EpochMillis, ProfileId},
};
use serde::{Deserialize, Serialize};

pub const UNKNOWN_NAME: &str = "Unknown";
pub const NO_EMAIL: &str = "No email";

/// Identity fields of a platform profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id:         ProfileId,
    pub email:      Option<String>,
    pub first_name: Option<String>,
    pub last_name:  Option<String>,
    pub created_at: Option<EpochMillis>,
}

impl Profile {
    pub fn new(id: impl Into<ProfileId>) -> Self {
        Self { id: id.into(), ..Self::default() }
    }

    /// `first last`, then first, then last, then email, then "Unknown".
    pub fn display_name(&self) -> String {
        let first = present(&self.first_name);
        let last = present(&self.last_name);
        match (first, last) {
            (Some(f), Some(l)) => format!("{f} {l}"),
            (Some(f), None) => f.to_string(),
            (None, Some(l)) => l.to_string(),
            (None, None) => present(&self.email).unwrap_or(UNKNOWN_NAME).to_string(),
        }
    }

    pub fn display_email(&self) -> String {
        present(&self.email).unwrap_or(NO_EMAIL).to_string()
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id:                           ProfileId,
    pub email:                        String,
    pub name:                         String,
    pub first_name:                   String,
    pub last_name:                    String,
    pub strategy:                     ScoringStrategy,
    pub risk_score:                   u8,
    pub risk_tier:                    RiskTier,
    pub churn_signals:                Vec<String>,
    /// Trailing 30-day engagement.
    pub engagement:                   EngagementMetrics,
    /// Percent, rounded.
    pub open_rate:                    u32,
    /// Percent, rounded.
    pub click_rate:                   u32,
    /// Same value as `open_rate`; kept for consumers ranking by engagement.
    pub email_engagement_rate:        u32,
    /// Open-rate change between the two 30-day windows, in percentage points.
    pub engagement_trend:             i32,
    pub days_since_last_open:         i64,
    pub days_since_last_click:        i64,
    pub days_since_last_product_view: i64,
    pub days_since_last_purchase:     i64,
    pub product_views:                u32,
    pub purchase_count:               u32,
    pub total_spent:                  f64,
    pub last_purchase_at:             Option<EpochMillis>,
    pub top_products:                 Vec<String>,
}

impl Customer {
    pub fn assemble(
        profile: &Profile,
        features: &CustomerFeatures,
        breakdown: &RiskBreakdown,
        churn_signals: Vec<String>,
    ) -> Self {
        let risk_score = breakdown.score();
        let open_rate = percent(features.engagement.open_rate);

        Self {
            id: profile.id.clone(),
            email: profile.display_email(),
            name: profile.display_name(),
            first_name: present(&profile.first_name).unwrap_or_default().to_string(),
            last_name: present(&profile.last_name).unwrap_or_default().to_string(),
            strategy: breakdown.strategy(),
            risk_score,
            risk_tier: RiskTier::from_score(risk_score),
            churn_signals,
            engagement: features.engagement.clone(),
            open_rate,
            click_rate: percent(features.engagement.click_rate),
            email_engagement_rate: open_rate,
            engagement_trend: (features.trend.delta * 100.0).round() as i32,
            days_since_last_open: features.days_since_last_open,
            days_since_last_click: features.days_since_last_click,
            days_since_last_product_view: features.days_since_last_product_view,
            days_since_last_purchase: features.days_since_last_purchase,
            product_views: features.product.views,
            purchase_count: features.purchases.purchase_count,
            total_spent: features.purchases.total_spent,
            last_purchase_at: features.purchases.last_purchase_at,
            top_products: features.purchases.top_products.clone(),
        }
    }
}

fn percent(rate: f64) -> u32 {
    (rate.clamp(0.0, 1.0) * 100.0).round() as u32
}
