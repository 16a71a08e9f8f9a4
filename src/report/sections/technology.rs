use super::{cycle, keyword_matches};
use crate::report::model::{AdoptionSeries, InnovationTrend, NamedValue, TechnologyData, YearValue};

const KEYWORDS: [&str; 6] = ["technolog", "innovat", "digital", "ai", "cloud", "data"];
const MAX_TRENDS: usize = 6;
const TIMELINE_YEARS: i32 = 5;

const READINESS: [&str; 4] = ["Emerging", "Early adoption", "Growing", "Mature"];
const IMPACTS: [&str; 3] = ["High", "Medium", "Low"];
const DESCRIPTIONS: [&str; 6] = [
    "Expected to reshape core operations and cost structures over the next few years.",
    "Enables new products and business models for early movers.",
    "Improves efficiency across the value chain as adoption spreads.",
    "Raises the baseline capability that customers expect from vendors.",
    "Creates room for specialized entrants to compete with incumbents.",
    "Requires investment in skills and infrastructure to capture its value.",
];

/// (technology, adoption % in the first year, yearly increase)
const ADOPTION_CURVES: [(&str, f64, f64); 4] = [
    ("AI & Machine Learning", 20.0, 12.0),
    ("Cloud Computing", 45.0, 8.0),
    ("IoT", 25.0, 9.0),
    ("Blockchain", 8.0, 5.0),
];

const RD_INVESTMENT: [(&str, f64); 4] = [
    ("Software", 35.0),
    ("Hardware", 25.0),
    ("Services", 20.0),
    ("Research", 20.0),
];

const IMPACT_SCORES: [(&str, f64); 4] = [
    ("AI & Machine Learning", 90.0),
    ("Cloud Computing", 80.0),
    ("IoT", 70.0),
    ("Blockchain", 50.0),
];

/// Builds technology and innovation data from trends and opportunities. The
/// adoption timeline starts at `base_year`.
pub fn synthesize(trends: &[String], opportunities: &[String], base_year: i32) -> TechnologyData {
    let innovation_trends = keyword_matches(trends.iter().chain(opportunities), &KEYWORDS, MAX_TRENDS)
        .into_iter()
        .enumerate()
        .map(|(i, name)| InnovationTrend {
            name: name.to_string(),
            description: cycle(&DESCRIPTIONS, i).to_string(),
            readiness: cycle(&READINESS, i).to_string(),
            impact: cycle(&IMPACTS, i).to_string(),
        })
        .collect();

    let adoption_timeline = ADOPTION_CURVES
        .iter()
        .map(|(technology, start, step)| AdoptionSeries {
            technology: technology.to_string(),
            points: (0..TIMELINE_YEARS)
                .map(|offset| YearValue {
                    year: base_year + offset,
                    value: (start + step * f64::from(offset)).min(100.0),
                })
                .collect(),
        })
        .collect();

    TechnologyData {
        adoption_timeline,
        rd_investment: RD_INVESTMENT
            .iter()
            .map(|(name, value)| NamedValue::new(*name, *value))
            .collect(),
        impact_scores: IMPACT_SCORES
            .iter()
            .map(|(name, value)| NamedValue::new(*name, *value))
            .collect(),
        innovation_trends,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_innovation_trends_scan_trends_then_opportunities() {
        let trends = vec![
            "Generative AI in design tools".to_string(),
            "Consolidation among suppliers".to_string(),
        ];
        let opportunities = vec!["Cloud-native platforms".to_string()];
        let data = synthesize(&trends, &opportunities, 2024);

        let names: Vec<&str> = data.innovation_trends.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Generative AI in design tools", "Cloud-native platforms"]);
        assert_eq!(data.innovation_trends[0].readiness, "Emerging");
        assert_eq!(data.innovation_trends[1].readiness, "Early adoption");
        assert_eq!(data.innovation_trends[1].impact, "Medium");
    }

    #[test]
    fn test_innovation_trends_capped_at_six() {
        let trends: Vec<String> = (0..10).map(|i| format!("Digital wave {i}")).collect();
        let data = synthesize(&trends, &[], 2024);
        assert_eq!(data.innovation_trends.len(), 6);
        assert_eq!(data.innovation_trends[5].description, DESCRIPTIONS[5]);
        assert_eq!(data.innovation_trends[4].readiness, "Emerging");
    }

    #[test]
    fn test_adoption_timeline_spans_five_years() {
        let data = synthesize(&[], &[], 2025);
        assert_eq!(data.adoption_timeline.len(), 4);
        for series in &data.adoption_timeline {
            let years: Vec<i32> = series.points.iter().map(|p| p.year).collect();
            assert_eq!(years, vec![2025, 2026, 2027, 2028, 2029]);
            assert!(series.points.iter().all(|p| p.value <= 100.0));
        }
        let cloud = &data.adoption_timeline[1];
        assert_eq!(cloud.points[4].value, 77.0);
    }
}
