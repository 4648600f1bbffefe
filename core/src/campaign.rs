//! Win-back campaign prompt and reply handling.
//!
//! The prompt builder reads only three things from a customer: the display
//! name, days since the last product view, and the sign of the engagement
//! trend. The LLM transport itself lives outside this crate.

use crate::{
    customer::Customer,
    error::{ChurnError, ChurnResult},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SYSTEM_PROMPT: &str =
    "You are an expert e-commerce email marketing copywriter. Always respond with valid JSON only.";

const DEFAULT_SUBJECT: &str = "We Miss You!";
const DEFAULT_PREHEADER: &str = "Come back and save 20%";
const DEFAULT_CTA: &str = "Shop Now & Save 20%";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignTone {
    #[default]
    Friendly,
    Professional,
    Casual,
    Luxury,
}

impl CampaignTone {
    pub fn description(&self) -> &'static str {
        match self {
            CampaignTone::Friendly => "warm, personal, and conversational",
            CampaignTone::Professional => "polished, respectful, and business-appropriate",
            CampaignTone::Casual => "relaxed, fun, and approachable",
            CampaignTone::Luxury => "sophisticated, exclusive, and premium",
        }
    }

    /// Unknown tone names fall back to Friendly.
    pub fn parse_or_default(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "professional" => CampaignTone::Professional,
            "casual" => CampaignTone::Casual,
            "luxury" => CampaignTone::Luxury,
            _ => CampaignTone::Friendly,
        }
    }
}

/// Copy for one win-back email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedCampaign {
    pub subject:   String,
    pub preheader: String,
    pub body:      String,
    pub cta:       String,
}

fn trend_label(engagement_trend: i32) -> &'static str {
    match engagement_trend {
        t if t > 0 => "increasing",
        t if t < 0 => "declining",
        _ => "stable",
    }
}

pub fn build_campaign_prompt(customer: &Customer, tone: CampaignTone) -> String {
    format!(
        "You are an expert e-commerce email marketing copywriter. Create a win-back email campaign for a customer with these details:
- Name: {name}
- Last Product Viewed: {days} days ago
- Engagement trend: {trend}

Create a personalized campaign that:
1. Acknowledges their past loyalty
2. Creates urgency with a 20% discount expiring in 48 hours
3. Recommends 3 products based on their history
4. Uses a {tone} tone

Return ONLY valid JSON with this exact structure:
{{
  \"subject\": \"subject line under 60 characters\",
  \"preheader\": \"preview text under 100 characters\",
  \"body\": \"full email body with proper formatting\",
  \"cta\": \"call to action button text\"
}}",
        name = customer.name,
        days = customer.days_since_last_product_view,
        trend = trend_label(customer.engagement_trend),
        tone = tone.description(),
    )
}

/// Fallback body used when the reply omits one.
pub fn default_body(customer: &Customer) -> String {
    let greeting = if customer.first_name.is_empty() {
        customer.name.as_str()
    } else {
        customer.first_name.as_str()
    };

    format!(
        "Hi {greeting},

We noticed it's been {days} days since your last visit, and we miss you!

As one of our valued customers, we wanted to reach out with a special offer just for you: 20% off your next purchase!

This exclusive discount is our way of saying thank you for being part of our community. But hurry - this offer expires in just 48 hours.

Click below to start shopping and automatically apply your discount.

We can't wait to see you again!",
        days = customer.days_since_last_product_view,
    )
}

/// Extract the outermost JSON object from a model reply and fill any
/// missing or empty field with its default.
pub fn parse_campaign_reply(reply: &str, customer: &Customer) -> ChurnResult<GeneratedCampaign> {
    let start = reply.find('{').ok_or(ChurnError::CampaignReplyMissingJson)?;
    let end = reply.rfind('}').ok_or(ChurnError::CampaignReplyMissingJson)?;
    if end < start {
        return Err(ChurnError::CampaignReplyMissingJson);
    }

    let parsed: Value = serde_json::from_str(&reply[start..=end])?;
    let field = |key: &str| {
        parsed
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    Ok(GeneratedCampaign {
        subject:   field("subject").unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
        preheader: field("preheader").unwrap_or_else(|| DEFAULT_PREHEADER.to_string()),
        body:      field("body").unwrap_or_else(|| default_body(customer)),
        cta:       field("cta").unwrap_or_else(|| DEFAULT_CTA.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        customer::Profile,
        features::CustomerFeatures,
        scoring::{EngagementBreakdown, RiskBreakdown},
    };

    fn customer(first: Option<&str>, trend_delta: f64) -> Customer {
        let profile = Profile {
            id: "p".into(),
            email: Some("sam@example.com".into()),
            first_name: first.map(Into::into),
            last_name: Some("Rivera".into()),
            created_at: None,
        };
        let mut features = CustomerFeatures::default();
        features.days_since_last_product_view = 12;
        features.trend.delta = trend_delta;
        let breakdown = RiskBreakdown::Engagement(EngagementBreakdown {
            open_rate_component: 0.0,
            click_rate_component: 0.0,
            open_recency_component: 0.0,
            product_recency_component: 0.0,
            trend_component: 0.0,
            frequency_credit: 0.0,
            negative_action_component: 0.0,
            raw: 0.5,
            score: 50,
        });
        Customer::assemble(&profile, &features, &breakdown, vec![])
    }

    #[test]
    fn prompt_uses_name_recency_and_trend_sign() {
        let prompt = build_campaign_prompt(&customer(Some("Sam"), -0.2), CampaignTone::Luxury);
        assert!(prompt.contains("- Name: Sam Rivera"));
        assert!(prompt.contains("- Last Product Viewed: 12 days ago"));
        assert!(prompt.contains("- Engagement trend: declining"));
        assert!(prompt.contains("sophisticated, exclusive, and premium"));

        let stable = build_campaign_prompt(&customer(Some("Sam"), 0.001), CampaignTone::Friendly);
        assert!(stable.contains("- Engagement trend: stable"));
    }

    #[test]
    fn reply_json_is_extracted_from_prose() {
        let reply = "Sure! Here you go:\n{\"subject\": \"Come back\", \"cta\": \"Shop\"}\nEnjoy.";
        let campaign = parse_campaign_reply(reply, &customer(Some("Sam"), 0.0)).unwrap();
        assert_eq!(campaign.subject, "Come back");
        assert_eq!(campaign.cta, "Shop");
        assert_eq!(campaign.preheader, DEFAULT_PREHEADER);
        assert!(campaign.body.starts_with("Hi Sam,"));
        assert!(campaign.body.contains("12 days since your last visit"));
    }

    #[test]
    fn default_body_falls_back_to_display_name() {
        let body = default_body(&customer(None, 0.0));
        assert!(body.starts_with("Hi Rivera,"));
    }

    #[test]
    fn reply_without_json_is_an_error() {
        let err = parse_campaign_reply("no json here", &customer(None, 0.0)).unwrap_err();
        assert!(matches!(err, ChurnError::CampaignReplyMissingJson));
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let err = parse_campaign_reply("{ subject: nope }", &customer(None, 0.0)).unwrap_err();
        assert!(matches!(err, ChurnError::Serialization(_)));
    }

    #[test]
    fn tone_parsing() {
        assert_eq!(CampaignTone::parse_or_default("Casual"), CampaignTone::Casual);
        assert_eq!(CampaignTone::parse_or_default("shouty"), CampaignTone::Friendly);
    }
}
