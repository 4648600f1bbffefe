//! Event classifier: tags events with the metric kind they represent.
//!
//! An event whose metric id is not in the catalog is never classified,
//! whatever the strategy. Unclassified events are excluded from every
//! typed aggregate but never block the rest of the profile from scoring.
//!
//! Name strategy: exact canonical names first, then case-insensitive
//! substring rules evaluated in a fixed order.
//! Id strategy: the configured `MetricIdTable`.

use crate::{
    catalog::MetricCatalog,
    config::{ClassifierConfig, ClassifierStrategy, MetricIdTable},
    event::Event,
    types::EpochMillis,
    window::Timestamped,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    EmailReceived,
    EmailOpened,
    EmailClicked,
    ProductViewed,
    OrderPlaced,
    NegativeAction,
}

const EXACT_NAMES: &[(&str, MetricKind)] = &[
    ("Received Email",                   MetricKind::EmailReceived),
    ("Opened Email",                     MetricKind::EmailOpened),
    ("Clicked Email",                    MetricKind::EmailClicked),
    ("Viewed Product",                   MetricKind::ProductViewed),
    ("Placed Order",                     MetricKind::OrderPlaced),
    ("Ordered Product",                  MetricKind::OrderPlaced),
    ("Unsubscribed",                     MetricKind::NegativeAction),
    ("Unsubscribed from Email Marketing", MetricKind::NegativeAction),
    ("Marked Email as Spam",             MetricKind::NegativeAction),
];

/// Checked in order; the first rule with a matching fragment wins.
const SUBSTRING_RULES: &[(&[&str], MetricKind)] = &[
    (&["unsubscrib", "spam"],                 MetricKind::NegativeAction),
    (&["order", "purchase"],                  MetricKind::OrderPlaced),
    (&["viewed product", "product view"],     MetricKind::ProductViewed),
    (&["click"],                              MetricKind::EmailClicked),
    (&["open"],                               MetricKind::EmailOpened),
    (&["receiv", "deliver"],                  MetricKind::EmailReceived),
];

/// Classify a canonical metric name.
pub fn kind_for_name(name: &str) -> Option<MetricKind> {
    let trimmed = name.trim();
    if let Some((_, kind)) = EXACT_NAMES.iter().find(|(n, _)| *n == trimmed) {
        return Some(*kind);
    }

    let lower = trimmed.to_lowercase();
    SUBSTRING_RULES
        .iter()
        .find(|(fragments, _)| fragments.iter().any(|f| lower.contains(f)))
        .map(|(_, kind)| *kind)
}

fn kind_for_id(table: &MetricIdTable, metric_id: &str) -> Option<MetricKind> {
    let lists: [(&Vec<String>, MetricKind); 6] = [
        (&table.negative_action, MetricKind::NegativeAction),
        (&table.received_email,  MetricKind::EmailReceived),
        (&table.opened_email,    MetricKind::EmailOpened),
        (&table.clicked_email,   MetricKind::EmailClicked),
        (&table.viewed_product,  MetricKind::ProductViewed),
        (&table.placed_order,    MetricKind::OrderPlaced),
    ];
    lists
        .iter()
        .find(|(ids, _)| ids.iter().any(|id| id == metric_id))
        .map(|(_, kind)| *kind)
}

/// An event paired with its classified kind. Borrowed for the
/// duration of one scoring call.
#[derive(Debug, Clone, Copy)]
pub struct TaggedEvent<'e> {
    pub event: &'e Event,
    pub kind:  MetricKind,
}

impl Timestamped for TaggedEvent<'_> {
    fn timestamp(&self) -> Option<EpochMillis> {
        self.event.timestamp
    }
}

pub struct EventClassifier<'a> {
    catalog: &'a MetricCatalog,
    config:  &'a ClassifierConfig,
}

impl<'a> EventClassifier<'a> {
    pub fn new(catalog: &'a MetricCatalog, config: &'a ClassifierConfig) -> Self {
        Self { catalog, config }
    }

    pub fn classify(&self, event: &Event) -> Option<MetricKind> {
        let name = self.catalog.resolve(&event.metric_id)?;
        match self.config.strategy {
            ClassifierStrategy::ByName => kind_for_name(name),
            ClassifierStrategy::ById => kind_for_id(&self.config.metric_ids, &event.metric_id),
        }
    }

    /// Tag every classifiable event, preserving input order.
    pub fn tag_all<'e>(&self, events: &'e [Event]) -> Vec<TaggedEvent<'e>> {
        let tagged: Vec<TaggedEvent<'e>> = events
            .iter()
            .filter_map(|event| self.classify(event).map(|kind| TaggedEvent { event, kind }))
            .collect();

        let unknown = events.len() - tagged.len();
        if unknown > 0 {
            log::trace!("classifier: {unknown} of {} events unclassified", events.len());
        }
        tagged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn catalog() -> MetricCatalog {
        MetricCatalog::builder()
            .insert("TZ3tKS", "Received Email")
            .insert("VMtmgm", "Opened Email")
            .insert("XzTeLQ", "Clicked Email")
            .insert("RQwDmd", "Viewed Product")
            .insert("ORD", "Placed Order")
            .insert("SHOP", "Shopify Purchase Completed")
            .insert("Tn2r9f", "Unsubscribed")
            .insert("SMS", "Opened SMS link")
            .freeze()
    }

    fn event(metric_id: &str) -> Event {
        Event::new("e", metric_id, 0_i64, Map::new())
    }

    #[test]
    fn exact_names_take_priority() {
        assert_eq!(kind_for_name("Placed Order"), Some(MetricKind::OrderPlaced));
        assert_eq!(kind_for_name("Opened Email"), Some(MetricKind::EmailOpened));
    }

    #[test]
    fn substring_fallbacks() {
        assert_eq!(kind_for_name("Refunded ORDER"), Some(MetricKind::OrderPlaced));
        assert_eq!(kind_for_name("purchase completed"), Some(MetricKind::OrderPlaced));
        assert_eq!(kind_for_name("Marked Email As SPAM"), Some(MetricKind::NegativeAction));
        assert_eq!(kind_for_name("Email Delivered"), Some(MetricKind::EmailReceived));
        assert_eq!(kind_for_name("Active on Site"), None);
    }

    #[test]
    fn name_strategy_resolves_through_catalog() {
        let catalog = catalog();
        let config = ClassifierConfig::default();
        let classifier = EventClassifier::new(&catalog, &config);

        assert_eq!(classifier.classify(&event("SHOP")), Some(MetricKind::OrderPlaced));
        assert_eq!(classifier.classify(&event("SMS")), Some(MetricKind::EmailOpened));
        assert_eq!(classifier.classify(&event("missing")), None);
    }

    #[test]
    fn id_strategy_uses_table() {
        let catalog = catalog();
        let config = ClassifierConfig {
            strategy: ClassifierStrategy::ById,
            ..ClassifierConfig::default()
        };
        let classifier = EventClassifier::new(&catalog, &config);

        assert_eq!(classifier.classify(&event("VMtmgm")), Some(MetricKind::EmailOpened));
        assert_eq!(classifier.classify(&event("Tn2r9f")), Some(MetricKind::NegativeAction));
        // Listed in the catalog but not in the id table.
        assert_eq!(classifier.classify(&event("ORD")), None);
    }

    #[test]
    fn id_strategy_still_requires_catalog_entry() {
        let catalog = MetricCatalog::default();
        let config = ClassifierConfig {
            strategy: ClassifierStrategy::ById,
            ..ClassifierConfig::default()
        };
        let classifier = EventClassifier::new(&catalog, &config);
        assert_eq!(classifier.classify(&event("VMtmgm")), None);
    }

    #[test]
    fn tag_all_preserves_order_and_drops_unknown() {
        let catalog = catalog();
        let config = ClassifierConfig::default();
        let classifier = EventClassifier::new(&catalog, &config);
        let events = vec![event("XzTeLQ"), event("zzz"), event("TZ3tKS")];

        let kinds: Vec<_> = classifier.tag_all(&events).iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![MetricKind::EmailClicked, MetricKind::EmailReceived]);
    }
}
