use crate::report::model::{CompetitorProfile, CompetitorsData, KeyPlayer, NamedValue, StrategicScore};

const STRENGTHS: [[&str; 2]; 4] = [
    ["Strong brand recognition", "Extensive distribution network"],
    ["Innovative product portfolio", "Agile development process"],
    ["Cost leadership", "Operational efficiency"],
    ["Loyal customer base", "Specialized expertise"],
];

const WEAKNESSES: [[&str; 2]; 4] = [
    ["High cost structure", "Slower to adapt to change"],
    ["Limited geographic reach", "Dependence on key products"],
    ["Weaker brand positioning", "Thin margins"],
    ["Limited scale", "Narrow product range"],
];

const STRATEGIES: [[&str; 2]; 4] = [
    ["Expand into emerging markets", "Acquire complementary businesses"],
    ["Invest in R&D and new product launches", "Form technology partnerships"],
    ["Compete on price and volume", "Optimize the supply chain"],
    ["Focus on niche segments", "Deepen customer relationships"],
];

/// (dimension, market leader score, industry average)
const STRATEGIC_POSITION: [(&str, f64, f64); 5] = [
    ("Innovation", 85.0, 60.0),
    ("Market reach", 90.0, 55.0),
    ("Pricing power", 75.0, 50.0),
    ("Customer loyalty", 80.0, 58.0),
    ("Operational efficiency", 78.0, 62.0),
];

/// Builds one competitor profile per key player.
pub fn synthesize(key_players: &[KeyPlayer]) -> CompetitorsData {
    let profiles = key_players
        .iter()
        .enumerate()
        .map(|(rank, player)| CompetitorProfile {
            name: player.name.clone(),
            share: player.share,
            strengths: owned(&STRENGTHS[rank % 4]),
            weaknesses: owned(&WEAKNESSES[rank % 4]),
            strategies: owned(&STRATEGIES[rank % 4]),
        })
        .collect();

    let rd_investment = key_players
        .iter()
        .map(|player| NamedValue::new(player.name.clone(), rd_investment(player.share)))
        .collect();

    CompetitorsData {
        profiles,
        rd_investment,
        strategic_position: STRATEGIC_POSITION
            .iter()
            .map(|(dimension, leader, average)| StrategicScore {
                dimension: dimension.to_string(),
                leader: *leader,
                average: *average,
            })
            .collect(),
    }
}

/// Estimated R&D spend (% of revenue) scaled from market share.
fn rd_investment(share: f64) -> f64 {
    ((share * 0.35 + 2.0) * 10.0).round() / 10.0
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
