use serde::{Deserialize, Serialize};

/// A fully normalized market-research report. Every field is always present
/// once a report has been through [`crate::report::enhance`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub title: String,
    pub summary: String,
    pub market_size: String,
    pub growth_rate: String,
    pub forecast: String,
    pub key_players: Vec<String>,
    pub key_players_data: Vec<KeyPlayer>,
    pub segments: Vec<MarketShare>,
    pub regions: Vec<MarketShare>,
    pub trends: Vec<String>,
    pub challenges: Vec<String>,
    pub opportunities: Vec<String>,
    pub forecast_data: Vec<YearValue>,
    pub swot: Swot,
    pub consumer_data: ConsumerData,
    pub technology_data: TechnologyData,
    pub regulatory_data: RegulatoryData,
    pub competitors_data: CompetitorsData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPlayer {
    pub name: String,
    pub share: f64,
}

/// A segment or region entry. `value` is the chart weight derived from `share`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketShare {
    pub name: String,
    pub description: String,
    pub share: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearValue {
    pub year: i32,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Swot {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub opportunities: Vec<String>,
    pub threats: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedValue {
    pub name: String,
    pub value: f64,
}

impl NamedValue {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

// --- Derived sections ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerData {
    pub demographics: Vec<NamedValue>,
    pub channel_preferences: Vec<NamedValue>,
    pub purchase_factors: Vec<NamedValue>,
    pub behavior_trends: Vec<BehaviorTrend>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorTrend {
    pub trend: String,
    pub impact: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnologyData {
    pub adoption_timeline: Vec<AdoptionSeries>,
    pub rd_investment: Vec<NamedValue>,
    pub impact_scores: Vec<NamedValue>,
    pub innovation_trends: Vec<InnovationTrend>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdoptionSeries {
    pub technology: String,
    pub points: Vec<YearValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InnovationTrend {
    pub name: String,
    pub description: String,
    pub readiness: String,
    pub impact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulatoryData {
    pub regulations: Vec<Regulation>,
    pub considerations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Regulation {
    pub name: String,
    pub region: String,
    pub impact: String,
    pub status: String,
    pub description: String,
    pub compliance: String,
    pub deadline: String,
    pub penalty: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorsData {
    pub profiles: Vec<CompetitorProfile>,
    pub rd_investment: Vec<NamedValue>,
    pub strategic_position: Vec<StrategicScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorProfile {
    pub name: String,
    pub share: f64,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub strategies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategicScore {
    pub dimension: String,
    pub leader: f64,
    pub average: f64,
}
