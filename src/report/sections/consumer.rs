use super::{cycle, keyword_matches};
use crate::report::model::{BehaviorTrend, ConsumerData, NamedValue};

const KEYWORDS: [&str; 2] = ["consumer", "customer"];
const MAX_TRENDS: usize = 5;

const IMPACTS: [&str; 3] = ["High", "Medium", "Low"];

const DESCRIPTIONS: [&str; 4] = [
    "Shifting expectations are changing how buyers evaluate and purchase in this market.",
    "Purchasing patterns point to growing demand for convenience and personalization.",
    "Customer loyalty increasingly depends on experience rather than price alone.",
    "Buyers are researching more before committing, lengthening the decision cycle.",
];

const DEMOGRAPHICS: [(&str, f64); 5] = [
    ("18-24", 15.0),
    ("25-34", 30.0),
    ("35-44", 25.0),
    ("45-54", 18.0),
    ("55+", 12.0),
];

const CHANNELS: [(&str, f64); 4] = [
    ("Online", 45.0),
    ("In-store", 30.0),
    ("Mobile app", 20.0),
    ("Other", 5.0),
];

const PURCHASE_FACTORS: [(&str, f64); 5] = [
    ("Price", 85.0),
    ("Quality", 80.0),
    ("Convenience", 70.0),
    ("Brand reputation", 65.0),
    ("Sustainability", 55.0),
];

/// Builds consumer insights from the report's trends.
pub fn synthesize(trends: &[String]) -> ConsumerData {
    let behavior_trends = keyword_matches(trends, &KEYWORDS, MAX_TRENDS)
        .into_iter()
        .enumerate()
        .map(|(i, trend)| BehaviorTrend {
            trend: trend.to_string(),
            impact: cycle(&IMPACTS, i).to_string(),
            description: cycle(&DESCRIPTIONS, i).to_string(),
        })
        .collect();

    ConsumerData {
        demographics: table(&DEMOGRAPHICS),
        channel_preferences: table(&CHANNELS),
        purchase_factors: table(&PURCHASE_FACTORS),
        behavior_trends,
    }
}

fn table(rows: &[(&str, f64)]) -> Vec<NamedValue> {
    rows.iter()
        .map(|(name, value)| NamedValue::new(*name, *value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_behavior_trends_from_matching_trends() {
        let trends = vec![
            "Consumer demand for plant-based options".to_string(),
            "Rising input costs".to_string(),
            "Customer preference for subscriptions".to_string(),
        ];
        let data = synthesize(&trends);

        assert_eq!(data.behavior_trends.len(), 2);
        assert_eq!(
            data.behavior_trends[0].trend,
            "Consumer demand for plant-based options"
        );
        assert_eq!(data.behavior_trends[0].impact, "High");
        assert_eq!(data.behavior_trends[1].impact, "Medium");
        assert_eq!(data.behavior_trends[1].description, DESCRIPTIONS[1]);
    }

    #[test]
    fn test_behavior_trends_capped_at_five() {
        let trends: Vec<String> = (0..8).map(|i| format!("Customer shift {i}")).collect();
        let data = synthesize(&trends);
        assert_eq!(data.behavior_trends.len(), 5);
        assert_eq!(data.behavior_trends[3].impact, "High");
    }

    #[test]
    fn test_fixed_tables_present_without_matches() {
        let data = synthesize(&[]);
        assert!(data.behavior_trends.is_empty());
        assert_eq!(data.demographics.len(), 5);
        assert_eq!(data.channel_preferences[0].name, "Online");
        let total: f64 = data.demographics.iter().map(|d| d.value).sum();
        assert_eq!(total, 100.0);
    }

    #[test]
    fn test_only_consumer_and_customer_match() {
        let trends = vec![
            "Buyer fatigue with subscriptions".to_string(),
            "Preference for local brands".to_string(),
            "Behavioral shift to mobile".to_string(),
        ];
        assert!(synthesize(&trends).behavior_trends.is_empty());

        let trends = vec!["CUSTOMERS expect same-day delivery".to_string()];
        assert_eq!(synthesize(&trends).behavior_trends.len(), 1);
    }
}
