//! Portfolio views over scored customers: risk tiers, at-risk ranking,
//! and the headline summary.

use crate::{customer::Customer, scoring::HIGH_VALUE_SPEND};
use serde::{Deserialize, Serialize};

/// Score at or above which a customer counts toward revenue at risk.
pub const HIGH_RISK_SCORE: u8 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn from_score(score: u8) -> Self {
        match score {
            70.. => RiskTier::High,
            40..=69 => RiskTier::Medium,
            _ => RiskTier::Low,
        }
    }
}

/// Which tiers a ranking should keep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierFilter {
    #[default]
    All,
    Only(RiskTier),
}

impl TierFilter {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Some(TierFilter::All),
            "high" => Some(TierFilter::Only(RiskTier::High)),
            "medium" => Some(TierFilter::Only(RiskTier::Medium)),
            "low" => Some(TierFilter::Only(RiskTier::Low)),
            _ => None,
        }
    }

    fn keeps(&self, tier: RiskTier) -> bool {
        match self {
            TierFilter::All => true,
            TierFilter::Only(t) => *t == tier,
        }
    }
}

/// Customers in the filter, highest risk first. Ties keep input order.
pub fn rank_at_risk(customers: &[Customer], filter: TierFilter) -> Vec<&Customer> {
    let mut ranked: Vec<&Customer> = customers
        .iter()
        .filter(|c| filter.keeps(c.risk_tier))
        .collect();
    ranked.sort_by(|a, b| b.risk_score.cmp(&a.risk_score));
    ranked
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TierDistribution {
    pub high:   usize,
    pub medium: usize,
    pub low:    usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub customers:            usize,
    pub high_risk_customers:  usize,
    pub revenue_at_risk:      f64,
    pub high_value_at_risk:   usize,
    pub average_risk_score:   f64,
    pub distribution:         TierDistribution,
}

impl PortfolioSummary {
    pub fn from_customers(customers: &[Customer]) -> Self {
        let mut summary = Self { customers: customers.len(), ..Self::default() };
        if customers.is_empty() {
            return summary;
        }

        let mut score_total = 0u64;
        for c in customers {
            score_total += u64::from(c.risk_score);

            if c.risk_score >= HIGH_RISK_SCORE {
                summary.high_risk_customers += 1;
                summary.revenue_at_risk += c.total_spent;
                if c.total_spent > HIGH_VALUE_SPEND {
                    summary.high_value_at_risk += 1;
                }
            }

            match c.risk_tier {
                RiskTier::High => summary.distribution.high += 1,
                RiskTier::Medium => summary.distribution.medium += 1,
                RiskTier::Low => summary.distribution.low += 1,
            }
        }

        summary.average_risk_score = score_total as f64 / customers.len() as f64;
        summary
    }
}
