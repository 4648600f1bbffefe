use crate::{
    error::{ChurnError, ChurnResult},
    types::MetricId,
};
use serde::{Deserialize, Serialize};

// ── Strategy selection ─────────────────────────────────────────────

/// Which risk model scores a customer.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStrategy {
    /// Continuous, engagement-weighted model.
    #[default]
    Engagement,
    /// Bucketed, purchase-recency-weighted model.
    Purchase,
}

/// How open and click rates are derived from unique counts.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OpenRateMode {
    /// `min(unique, 1) / delivered` is what production reports.
    #[default]
    Capped,
    /// `min(unique / delivered, 1)`.
    Ratio,
}

// ── Thresholds ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ChurnThresholds {
    /// Days without a purchase after which the top recency bucket applies.
    pub days_since_last_purchase: f64,
    /// Percent (0-100) of delivered email that should be opened or clicked.
    pub min_engagement_rate: f64,
    /// Expected days between purchases.
    pub min_purchase_frequency: f64,
}

impl Default for ChurnThresholds {
    fn default() -> Self {
        Self {
            days_since_last_purchase: 90.0,
            min_engagement_rate: 20.0,
            min_purchase_frequency: 60.0,
        }
    }
}

// ── Classifier ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierStrategy {
    /// Resolve the metric id to its catalog name and match name rules.
    #[default]
    ByName,
    /// Match the metric id against `MetricIdTable`.
    ById,
}

/// Platform metric ids per event kind, used by `ClassifierStrategy::ById`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct MetricIdTable {
    pub received_email:  Vec<MetricId>,
    pub opened_email:    Vec<MetricId>,
    pub clicked_email:   Vec<MetricId>,
    pub viewed_product:  Vec<MetricId>,
    pub placed_order:    Vec<MetricId>,
    pub negative_action: Vec<MetricId>,
}

impl Default for MetricIdTable {
    fn default() -> Self {
        Self {
            received_email:  vec!["TZ3tKS".into()],
            opened_email:    vec!["VMtmgm".into()],
            clicked_email:   vec!["XzTeLQ".into()],
            viewed_product:  vec!["RQwDmd".into()],
            placed_order:    vec![],
            negative_action: vec!["Tn2r9f".into(), "VasiDJ".into()],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassifierConfig {
    pub strategy:   ClassifierStrategy,
    pub metric_ids: MetricIdTable,
}

// ── Top-level config ───────────────────────────────────────────────

/// Recognized scoring options. Unknown keys are ignored and missing keys
/// take their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoringConfig {
    pub scoring_strategy: ScoringStrategy,
    pub churn_thresholds: ChurnThresholds,
    pub open_rate_mode:   OpenRateMode,
    pub classifier:       ClassifierConfig,
}

impl ScoringConfig {
    /// Load and validate a JSON config file.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config = Self::from_json_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {path}: {e}"))?;
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> ChurnResult<Self> {
        let config: ScoringConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_strategy(mut self, strategy: ScoringStrategy) -> Self {
        self.scoring_strategy = strategy;
        self
    }

    /// Reject thresholds that would make scoring meaningless.
    /// Runs once, before any customer is scored.
    pub fn validate(&self) -> ChurnResult<()> {
        let t = &self.churn_thresholds;

        if !(t.days_since_last_purchase.is_finite() && t.days_since_last_purchase > 0.0) {
            return Err(ChurnError::InvalidConfig {
                field:  "churnThresholds.daysSinceLastPurchase",
                reason: format!("must be a positive number of days, got {}", t.days_since_last_purchase),
            });
        }

        if !(0.0..=100.0).contains(&t.min_engagement_rate) {
            return Err(ChurnError::InvalidConfig {
                field:  "churnThresholds.minEngagementRate",
                reason: format!("must be a percentage in [0, 100], got {}", t.min_engagement_rate),
            });
        }

        if !(t.min_purchase_frequency.is_finite() && t.min_purchase_frequency > 0.0) {
            return Err(ChurnError::InvalidConfig {
                field:  "churnThresholds.minPurchaseFrequency",
                reason: format!("must be a positive number of days, got {}", t.min_purchase_frequency),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_documented_defaults() {
        let config = ScoringConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ScoringConfig::default());
        assert_eq!(config.scoring_strategy, ScoringStrategy::Engagement);
        assert_eq!(config.churn_thresholds.days_since_last_purchase, 90.0);
        assert_eq!(config.churn_thresholds.min_engagement_rate, 20.0);
        assert_eq!(config.churn_thresholds.min_purchase_frequency, 60.0);
        assert_eq!(config.open_rate_mode, OpenRateMode::Capped);
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let config = ScoringConfig::from_json_str(
            r#"{
                "scoringStrategy": "purchase",
                "churnThresholds": { "minEngagementRate": 35 },
                "mistralModel": "ignored",
                "campaignTone": "Luxury"
            }"#,
        )
        .unwrap();

        assert_eq!(config.scoring_strategy, ScoringStrategy::Purchase);
        assert_eq!(config.churn_thresholds.min_engagement_rate, 35.0);
        assert_eq!(config.churn_thresholds.days_since_last_purchase, 90.0);
    }

    #[test]
    fn negative_threshold_fails_fast() {
        let err = ScoringConfig::from_json_str(
            r#"{ "churnThresholds": { "minPurchaseFrequency": -5 } }"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ChurnError::InvalidConfig { field: "churnThresholds.minPurchaseFrequency", .. }
        ));
    }

    #[test]
    fn engagement_rate_must_be_a_percentage() {
        let mut config = ScoringConfig::default();
        config.churn_thresholds.min_engagement_rate = 140.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_strategy_is_a_parse_error() {
        let err = ScoringConfig::from_json_str(r#"{ "scoringStrategy": "vibes" }"#).unwrap_err();
        assert!(matches!(err, ChurnError::Serialization(_)));
    }

    #[test]
    fn classifier_table_overrides() {
        let config = ScoringConfig::from_json_str(
            r#"{ "classifier": { "strategy": "by_id", "metricIds": { "placedOrder": ["ORD1"] } } }"#,
        )
        .unwrap();
        assert_eq!(config.classifier.strategy, ClassifierStrategy::ById);
        assert_eq!(config.classifier.metric_ids.placed_order, vec!["ORD1".to_string()]);
        assert_eq!(config.classifier.metric_ids.opened_email, vec!["VMtmgm".to_string()]);
    }
}
