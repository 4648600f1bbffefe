//! The scoring engine: one pure pipeline per profile.
//!
//! PIPELINE ORDER (fixed):
//!   1. Classify events through the frozen metric catalog
//!   2. Extract features (windows, aggregates, trend, recency)
//!   3. Score with the configured risk policy
//!   4. Generate signals
//!   5. Assemble the customer record
//!
//! RULES:
//!   - Config is validated once, when the engine is built.
//!   - Scoring a profile never fails and never retains its events.
//!   - `now` is always passed in; the engine never reads the clock.

use crate::{
    catalog::MetricCatalog,
    classifier::EventClassifier,
    config::ScoringConfig,
    customer::{Customer, Profile},
    error::ChurnResult,
    event::Event,
    features::CustomerFeatures,
    observer::{LogObserver, ScoringObserver},
    scoring::{policy_for, RiskPolicy},
    signals,
    types::EpochMillis,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, sync::Arc};

/// One profile and every event fetched for it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileEvents {
    pub profile: Profile,
    pub events:  Vec<Event>,
}

pub struct ChurnEngine {
    config:   ScoringConfig,
    catalog:  Arc<MetricCatalog>,
    policy:   Box<dyn RiskPolicy>,
    observer: Arc<dyn ScoringObserver>,
}

impl ChurnEngine {
    /// Validate the config and wire the selected policy.
    /// The catalog must already be frozen.
    pub fn new(config: ScoringConfig, catalog: Arc<MetricCatalog>) -> ChurnResult<Self> {
        config.validate()?;
        let policy = policy_for(&config);

        log::info!(
            "churn engine ready: strategy={:?} classifier={:?} open_rate_mode={:?} metrics={}",
            config.scoring_strategy,
            config.classifier.strategy,
            config.open_rate_mode,
            catalog.len(),
        );

        Ok(Self {
            config,
            catalog,
            policy,
            observer: Arc::new(LogObserver),
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn ScoringObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn catalog(&self) -> &MetricCatalog {
        &self.catalog
    }

    /// Steps 1-2 only: the features a profile would be scored on.
    pub fn features(&self, profile: &Profile, events: &[Event], now: EpochMillis) -> CustomerFeatures {
        let classifier = EventClassifier::new(&self.catalog, &self.config.classifier);
        let tagged = classifier.tag_all(events);
        CustomerFeatures::extract(&tagged, profile.created_at, now, &self.config)
    }

    /// Score one profile against its events.
    pub fn score(&self, profile: &Profile, events: &[Event], now: EpochMillis) -> Customer {
        let features = self.features(profile, events, now);
        self.observer.on_features(&profile.id, &features);

        let breakdown = self.policy.score(&features);
        self.observer.on_risk(&profile.id, &breakdown);

        let churn_signals = signals::generate(
            &features,
            self.policy.strategy(),
            &self.config.churn_thresholds,
        );

        let customer = Customer::assemble(profile, &features, &breakdown, churn_signals);
        self.observer.on_scored(&customer);
        customer
    }

    /// Score a profile whose event fetch may have failed. A failed fetch
    /// scores as a profile with zero events.
    pub fn score_fetched<E: Display>(
        &self,
        profile: &Profile,
        events: Result<Vec<Event>, E>,
        now: EpochMillis,
    ) -> Customer {
        match events {
            Ok(events) => self.score(profile, &events, now),
            Err(e) => {
                log::warn!("profile={} event fetch failed, scoring without events: {e}", profile.id);
                self.score(profile, &[], now)
            }
        }
    }

    /// Score many profiles in parallel. Output order matches input order.
    pub fn score_batch(&self, batch: &[ProfileEvents], now: EpochMillis) -> Vec<Customer> {
        let customers: Vec<Customer> = batch
            .par_iter()
            .map(|p| self.score(&p.profile, &p.events, now))
            .collect();

        log::info!(
            "scored {} profiles ({} events) with {:?} strategy",
            customers.len(),
            batch.iter().map(|p| p.events.len()).sum::<usize>(),
            self.policy.strategy(),
        );
        customers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::ScoringStrategy, error::ChurnError};

    #[test]
    fn invalid_config_is_rejected_before_scoring() {
        let mut config = ScoringConfig::default();
        config.churn_thresholds.days_since_last_purchase = -1.0;

        let result = ChurnEngine::new(config, Arc::new(MetricCatalog::default()));
        assert!(matches!(result, Err(ChurnError::InvalidConfig { .. })));
    }

    #[test]
    fn failed_fetch_scores_like_no_events() {
        let engine = ChurnEngine::new(
            ScoringConfig::default().with_strategy(ScoringStrategy::Purchase),
            Arc::new(MetricCatalog::default()),
        )
        .unwrap();
        let profile = Profile::new("p-1");
        let now = 1_750_000_000_000;

        let failed = engine.score_fetched(&profile, Err::<Vec<Event>, _>("timeout"), now);
        let empty = engine.score(&profile, &[], now);
        assert_eq!(failed, empty);
    }

    #[test]
    fn deserialized_batch_normalizes_timestamps() {
        let batch: ProfileEvents = serde_json::from_str(
            r#"{
                "profile": { "id": "p-1" },
                "events": [
                    { "id": "a", "metric_id": "m", "timestamp": 1700000000 },
                    { "id": "b", "metric_id": "m", "timestamp": "2023-11-14T22:13:20Z" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(batch.profile.id, "p-1");
        for event in &batch.events {
            assert_eq!(event.timestamp, Some(1_700_000_000_000));
        }
    }
}
