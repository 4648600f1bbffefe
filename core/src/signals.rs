//! Churn signal generation.
//!
//! RULES:
//!   - Each feature contributes at most one signal, the most severe rule it crosses.
//!   - Negative-action and zero-engagement signals come first, positive signals last.
//!   - The result is never empty.

use crate::{
    config::{ChurnThresholds, ScoringStrategy},
    features::CustomerFeatures,
    scoring::HIGH_VALUE_SPEND,
    types::NEVER_DAYS,
};

pub const FALLBACK_SIGNAL: &str = "Moderate engagement patterns detected";

pub fn generate(
    f: &CustomerFeatures,
    strategy: ScoringStrategy,
    thresholds: &ChurnThresholds,
) -> Vec<String> {
    let mut signals = Vec::new();
    let e = &f.engagement;

    if f.negative_actions > 0 {
        signals.push(format!(
            "{} negative email action{} (unsubscribe/spam)",
            f.negative_actions,
            if f.negative_actions == 1 { "" } else { "s" },
        ));
    }

    if e.unique_opens == 0 {
        signals.push("No email opens detected in past 30 days".to_string());
    } else if e.open_rate < 0.10 {
        signals.push("Very low email open rate (under 10%)".to_string());
    } else if e.open_rate < 0.20 {
        signals.push("Below average email open rate".to_string());
    }

    if e.unique_clicks == 0 && e.unique_opens > 0 {
        signals.push("Low click activity: opening emails but not clicking through".to_string());
    } else if e.click_rate < 0.05 {
        signals.push("Minimal email click activity".to_string());
    }

    if f.trend.delta < -0.25 {
        signals.push("Email engagement declining sharply (-25%+)".to_string());
    } else if f.trend.delta < -0.10 {
        signals.push("Email engagement trending downward".to_string());
    }

    // A profile that never opened is already covered by the open-rate rule.
    let open_days = f.days_since_last_open;
    if open_days != NEVER_DAYS {
        if open_days > 90 {
            signals.push(format!("No email opens in {open_days} days"));
        } else if open_days > 60 {
            signals.push(format!("Last email opened {open_days} days ago (over two months)"));
        } else if open_days > 30 {
            signals.push(format!("Last email opened {open_days} days ago"));
        }
    }

    let click_days = f.days_since_last_click;
    if click_days == NEVER_DAYS {
        signals.push("No email clicks on record".to_string());
    } else if click_days > 120 {
        signals.push(format!("No email clicks in {click_days}+ days"));
    } else if click_days > 60 {
        signals.push(format!("Last clicked email {click_days} days ago"));
    }

    let view_days = f.days_since_last_product_view;
    if view_days == NEVER_DAYS {
        signals.push("No product views detected".to_string());
    } else if view_days > 60 {
        signals.push(format!("Last viewed product {view_days} days ago"));
    } else if view_days > 30 {
        signals.push(format!("No product views in past 30 days (last {view_days} days ago)"));
    }

    if strategy == ScoringStrategy::Purchase {
        push_purchase_signals(&mut signals, f, thresholds);
    }

    // ── Positive signals ─────────────────────────────────────────
    if e.open_rate > 0.40 && e.click_rate > 0.15 {
        signals.push("Strong email engagement".to_string());
    }
    if f.trend.delta > 0.15 {
        signals.push("Email engagement improving".to_string());
    }
    if f.product.views > 5 && view_days < 7 {
        signals.push("Actively browsing products".to_string());
    }
    if strategy == ScoringStrategy::Purchase && f.purchases.total_spent > HIGH_VALUE_SPEND {
        signals.push(format!("High lifetime value (${:.0} spent)", f.purchases.total_spent));
    }

    if signals.is_empty() {
        signals.push(FALLBACK_SIGNAL.to_string());
    }
    signals
}

fn push_purchase_signals(signals: &mut Vec<String>, f: &CustomerFeatures, t: &ChurnThresholds) {
    let days = f.days_since_last_purchase;
    if days == NEVER_DAYS {
        signals.push("No purchases on record".to_string());
    } else if days as f64 > t.days_since_last_purchase {
        signals.push(format!("No purchase in {days} days"));
    } else if days > 60 {
        signals.push(format!("Last purchase {days} days ago"));
    }

    if f.engagement_rate_pct < t.min_engagement_rate {
        signals.push(format!(
            "Email engagement {:.0}% is below the {:.0}% minimum",
            f.engagement_rate_pct, t.min_engagement_rate,
        ));
    }

    if f.purchases.purchase_count < f.expected_purchases {
        signals.push(format!(
            "Purchasing less often than expected ({} of {} orders)",
            f.purchases.purchase_count, f.expected_purchases,
        ));
    }
}
