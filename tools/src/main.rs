//! churn-runner: headless batch scorer over marketing-platform JSON dumps.
//!
//! Usage:
//!   churn-runner --profiles profiles.json --metrics metrics.json --events-dir events/
//!   churn-runner --profiles p.json --metrics m.json --events-dir ev/ --config scoring.json \
//!                --now 2025-06-15T00:00:00Z --tier high --top 20
//!   churn-runner ... --json
//!   churn-runner ... --prompt <profile_id> --tone luxury
//!
//! Events for a profile are read from `<events-dir>/<profile_id>.json`.
//! A missing or unreadable events file scores that profile with no events.

use anyhow::{bail, Context, Result};
use churnguard_core::{
    campaign::{build_campaign_prompt, CampaignTone},
    config::ScoringConfig,
    customer::{Customer, Profile},
    engine::ChurnEngine,
    event::Event,
    portfolio::{rank_at_risk, PortfolioSummary, TierFilter},
    source::{catalog_from_metrics, load_document, PlatformEvent, PlatformMetric, PlatformProfile},
    types::EpochMillis,
};
use chrono::{DateTime, Utc};
use std::{env, path::Path, sync::Arc};
use uuid::Uuid;

#[derive(serde::Serialize)]
struct RunReport<'a> {
    run_id:    String,
    now:       EpochMillis,
    summary:   PortfolioSummary,
    customers: Vec<&'a Customer>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let profiles_path = required_arg(&args, "--profiles")?;
    let metrics_path = required_arg(&args, "--metrics")?;
    let events_dir = required_arg(&args, "--events-dir")?;
    let config_path = string_arg(&args, "--config");
    let top = parse_arg(&args, "--top", usize::MAX);
    let json_mode = args.iter().any(|a| a == "--json");
    let prompt_for = string_arg(&args, "--prompt");
    let tone = string_arg(&args, "--tone")
        .map(CampaignTone::parse_or_default)
        .unwrap_or_default();

    let tier = match string_arg(&args, "--tier") {
        Some(t) => TierFilter::parse(t).with_context(|| format!("Unknown tier '{t}'"))?,
        None => TierFilter::All,
    };
    let now = match string_arg(&args, "--now") {
        Some(s) => parse_now(s)?,
        None => Utc::now().timestamp_millis(),
    };

    let run_id = Uuid::new_v4().to_string();
    log::info!("run={run_id} now={now} profiles={profiles_path} metrics={metrics_path} events_dir={events_dir}");

    let config = match config_path {
        Some(path) => ScoringConfig::load(path)?,
        None => ScoringConfig::default(),
    };

    let catalog = catalog_from_metrics(load_document::<PlatformMetric>(metrics_path)?);
    let engine = ChurnEngine::new(config, Arc::new(catalog))?;

    let profiles: Vec<Profile> = load_document::<PlatformProfile>(profiles_path)?
        .into_iter()
        .map(Profile::from)
        .collect();

    // A profile whose events cannot be loaded is scored with none.
    let customers: Vec<Customer> = profiles
        .iter()
        .map(|profile| engine.score_fetched(profile, load_events(events_dir, &profile.id), now))
        .collect();
    log::info!("run={run_id} scored {} profiles", customers.len());

    let summary = PortfolioSummary::from_customers(&customers);
    let ranked: Vec<&Customer> = rank_at_risk(&customers, tier).into_iter().take(top).collect();

    if let Some(profile_id) = prompt_for {
        let customer = customers
            .iter()
            .find(|c| c.id == profile_id)
            .with_context(|| format!("No scored profile '{profile_id}'"))?;
        println!("{}", build_campaign_prompt(customer, tone));
        return Ok(());
    }

    if json_mode {
        let report = RunReport { run_id, now, summary, customers: ranked };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&run_id, now, &summary, &ranked);
    }

    Ok(())
}

fn load_events(dir: &str, profile_id: &str) -> Result<Vec<Event>> {
    let path = Path::new(dir).join(format!("{profile_id}.json"));
    let path = path.to_str().context("Events path is not valid UTF-8")?;
    Ok(load_document::<PlatformEvent>(path)?
        .into_iter()
        .map(Event::from)
        .collect())
}

fn print_report(run_id: &str, now: EpochMillis, summary: &PortfolioSummary, ranked: &[&Customer]) {
    println!("=== CHURN RISK ===");
    println!("  run_id:  {run_id}");
    println!("  now:     {}", format_millis(now));
    println!();
    println!("  {:<5} {:<6} {:<28} {:<32} {:>5} {:>6}  TOP SIGNAL", "SCORE", "TIER", "NAME", "EMAIL", "OPEN%", "SPENT");
    for c in ranked {
        println!(
            "  {:<5} {:<6} {:<28} {:<32} {:>5} {:>6.0}  {}",
            c.risk_score,
            format!("{:?}", c.risk_tier).to_lowercase(),
            truncate(&c.name, 28),
            truncate(&c.email, 32),
            c.open_rate,
            c.total_spent,
            c.churn_signals.first().map(String::as_str).unwrap_or_default(),
        );
    }

    println!();
    println!("=== PORTFOLIO SUMMARY ===");
    println!("  customers:          {}", summary.customers);
    println!("  high risk (>= 60):  {}", summary.high_risk_customers);
    println!("  revenue at risk:    ${:.2}", summary.revenue_at_risk);
    println!("  high value at risk: {}", summary.high_value_at_risk);
    println!("  average score:      {:.1}", summary.average_risk_score);
    println!(
        "  tiers:              high={} medium={} low={}",
        summary.distribution.high, summary.distribution.medium, summary.distribution.low
    );
}

/// Accepts RFC 3339 or epoch millis.
fn parse_now(s: &str) -> Result<EpochMillis> {
    if let Ok(millis) = s.parse::<i64>() {
        return Ok(millis);
    }
    match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => Ok(dt.timestamp_millis()),
        Err(e) => bail!("Invalid --now '{s}': {e}"),
    }
}

fn format_millis(millis: EpochMillis) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| millis.to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn required_arg<'a>(args: &'a [String], flag: &str) -> Result<&'a str> {
    string_arg(args, flag).with_context(|| format!("Missing required argument {flag}"))
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
