use super::{cycle, keyword_matches};
use crate::report::model::{Regulation, RegulatoryData};

const KEYWORDS: [&str; 4] = ["regul", "legisl", "compliance", "polic"];
const MAX_REGULATIONS: usize = 5;
const NAME_LIMIT: usize = 60;

const REGIONS: [&str; 4] = ["Global", "North America", "Europe", "Asia Pacific"];
const IMPACTS: [&str; 3] = ["High", "Medium", "Low"];
const STATUSES: [&str; 4] = ["Active", "Proposed", "Under review", "Phasing in"];
const COMPLIANCE: [&str; 4] = [
    "Review current practices against the new requirements.",
    "Assign ownership and document controls for audit.",
    "Monitor guidance from regulators as the rules are finalized.",
    "Budget for reporting and certification changes.",
];
const DEADLINES: [&str; 4] = ["Ongoing", "Within 12 months", "Within 24 months", "To be announced"];
const PENALTIES: [&str; 4] = [
    "Fines and enforcement action",
    "Restrictions on market access",
    "Mandatory remediation orders",
    "Reputational damage and litigation exposure",
];

const CONSIDERATIONS: [&str; 4] = [
    "Data protection and privacy obligations apply to customer information in most markets.",
    "Product safety and labeling standards differ between regions.",
    "Sustainability and ESG reporting requirements are expanding.",
    "Trade policy and tariffs can shift cost structures quickly.",
];

/// Extracts regulation records from challenges and trends. When nothing in
/// the report mentions regulation, two well-known example regulations are
/// returned instead of an empty list.
pub fn synthesize(challenges: &[String], trends: &[String]) -> RegulatoryData {
    let matches = keyword_matches(challenges.iter().chain(trends), &KEYWORDS, MAX_REGULATIONS);

    let regulations = if matches.is_empty() {
        example_regulations()
    } else {
        matches
            .into_iter()
            .enumerate()
            .map(|(i, text)| Regulation {
                name: short_name(text),
                region: cycle(&REGIONS, i).to_string(),
                impact: cycle(&IMPACTS, i).to_string(),
                status: cycle(&STATUSES, i).to_string(),
                description: text.to_string(),
                compliance: cycle(&COMPLIANCE, i).to_string(),
                deadline: cycle(&DEADLINES, i).to_string(),
                penalty: cycle(&PENALTIES, i).to_string(),
            })
            .collect()
    };

    RegulatoryData {
        regulations,
        considerations: CONSIDERATIONS.iter().map(|c| c.to_string()).collect(),
    }
}

fn example_regulations() -> Vec<Regulation> {
    vec![
        Regulation {
            name: "GDPR Compliance".to_string(),
            region: "European Union".to_string(),
            impact: "High".to_string(),
            status: "Active".to_string(),
            description: "General Data Protection Regulation governing the collection and \
                processing of personal data of EU residents."
                .to_string(),
            compliance: "Maintain a lawful basis for processing, records of processing and \
                data subject request handling."
                .to_string(),
            deadline: "In force since May 2018".to_string(),
            penalty: "Up to EUR 20 million or 4% of global annual turnover".to_string(),
        },
        Regulation {
            name: "Digital Services Act (DSA)".to_string(),
            region: "European Union".to_string(),
            impact: "Medium".to_string(),
            status: "Active".to_string(),
            description: "EU rules on transparency, content moderation and accountability \
                for online intermediaries and platforms."
                .to_string(),
            compliance: "Publish transparency reports and provide notice-and-action \
                mechanisms."
                .to_string(),
            deadline: "Fully applicable since February 2024".to_string(),
            penalty: "Up to 6% of global annual turnover".to_string(),
        },
    ]
}

fn short_name(text: &str) -> String {
    if text.chars().count() <= NAME_LIMIT {
        return text.to_string();
    }
    let cut: String = text.chars().take(NAME_LIMIT).collect();
    format!("{}...", cut.trim_end())
}
