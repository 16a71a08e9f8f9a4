//! Page model for the PDF export of an enhanced report.
//!
//! The renderer that turns an [`ExportDocument`] into PDF bytes lives on the
//! client; this module decides what goes on each page, in which order, and
//! which chart captures are usable.

use std::collections::HashMap;

use serde::Serialize;

use crate::report::Report;
use crate::report::model::YearValue;
use crate::telemetry::metrics::EXPORT_CHARTS_SKIPPED;

pub const KEY_PLAYERS_CHART: &str = "key-players-chart";
pub const SEGMENTS_CHART: &str = "segments-chart";
pub const REGIONS_CHART: &str = "regions-chart";
pub const FORECAST_CHART: &str = "forecast-chart";

const GROWTH_HEADERS: [&str; 3] = ["Year", "Value", "Growth"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportDocument {
    pub file_name: String,
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub title: String,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Paragraph {
        text: String,
    },
    BulletList {
        heading: String,
        items: Vec<String>,
    },
    Chart {
        element_id: String,
        image: String,
    },
    SwotQuadrant {
        category: String,
        color: SwotColor,
        items: Vec<String>,
    },
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SwotColor {
    Green,
    Red,
    Blue,
    Orange,
}

impl Page {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            blocks: Vec::new(),
        }
    }

    fn paragraph(mut self, text: impl Into<String>) -> Self {
        self.blocks.push(Block::Paragraph { text: text.into() });
        self
    }

    fn bullets(mut self, heading: &str, items: &[String]) -> Self {
        self.blocks.push(Block::BulletList {
            heading: heading.to_string(),
            items: items.to_vec(),
        });
        self
    }

    /// Appends the chart capture for `element_id` if one was supplied and is
    /// a usable image data URI. Anything else is logged and left out.
    fn chart(mut self, element_id: &str, charts: &HashMap<String, String>) -> Self {
        match charts.get(element_id) {
            Some(image) if is_image_data_uri(image) => {
                self.blocks.push(Block::Chart {
                    element_id: element_id.to_string(),
                    image: image.clone(),
                });
            }
            Some(_) => {
                tracing::warn!(chart = element_id, "Chart capture is not an image data URI, skipping");
                EXPORT_CHARTS_SKIPPED.add(1, &[opentelemetry::KeyValue::new("reason", "invalid")]);
            }
            None => {
                tracing::warn!(chart = element_id, "Chart capture missing, skipping");
                EXPORT_CHARTS_SKIPPED.add(1, &[opentelemetry::KeyValue::new("reason", "missing")]);
            }
        }
        self
    }
}

#[tracing::instrument(name = "export build_document", skip(report, charts), fields(export.pages))]
pub fn build_document(
    report: &Report,
    keyword: &str,
    charts: &HashMap<String, String>,
) -> ExportDocument {
    let mut pages = vec![
        Page::new(report.title.clone())
            .paragraph(report.summary.clone())
            .paragraph(format!("Market size: {}", report.market_size))
            .paragraph(format!("Growth rate: {}", report.growth_rate)),
        Page::new("Key Players")
            .bullets("Leading companies", &report.key_players)
            .chart(KEY_PLAYERS_CHART, charts),
        Page::new("Market Dynamics")
            .bullets("Trends", &report.trends)
            .bullets("Challenges", &report.challenges)
            .bullets("Opportunities", &report.opportunities),
        swot_page(report),
    ];

    let mut segments = Page::new("Market Segments");
    for segment in &report.segments {
        segments = segments.paragraph(format!(
            "{} ({}): {}",
            segment.name, segment.share, segment.description
        ));
    }
    pages.push(segments.chart(SEGMENTS_CHART, charts));

    let mut regions = Page::new("Regional Analysis");
    for region in &report.regions {
        regions = regions.paragraph(format!(
            "{} ({}): {}",
            region.name, region.share, region.description
        ));
    }
    pages.push(regions.chart(REGIONS_CHART, charts));

    let mut forecast = Page::new("Market Forecast").paragraph(report.forecast.clone());
    forecast = forecast.chart(FORECAST_CHART, charts);
    forecast.blocks.push(Block::Table {
        headers: GROWTH_HEADERS.iter().map(|h| h.to_string()).collect(),
        rows: growth_rows(&report.forecast_data),
    });
    pages.push(forecast);

    pages.push(Page::new("Conclusion").paragraph(conclusion(report, keyword)));

    tracing::Span::current().record("export.pages", pages.len());

    ExportDocument {
        file_name: file_name(keyword),
        pages,
    }
}

fn swot_page(report: &Report) -> Page {
    let swot = &report.swot;
    let quadrants = [
        ("Strengths", SwotColor::Green, &swot.strengths),
        ("Weaknesses", SwotColor::Red, &swot.weaknesses),
        ("Opportunities", SwotColor::Blue, &swot.opportunities),
        ("Threats", SwotColor::Orange, &swot.threats),
    ];

    let mut page = Page::new("SWOT Analysis");
    for (category, color, items) in quadrants {
        page.blocks.push(Block::SwotQuadrant {
            category: category.to_string(),
            color,
            items: items.clone(),
        });
    }
    page
}

/// Year-over-year growth rows for the forecast table.
fn growth_rows(points: &[YearValue]) -> Vec<Vec<String>> {
    let mut prev: Option<f64> = None;
    points
        .iter()
        .map(|point| {
            let growth = match prev {
                None => "-".to_string(),
                Some(p) if p == 0.0 => "N/A".to_string(),
                Some(p) => format!("{:.1}%", (point.value - p) / p * 100.0),
            };
            prev = Some(point.value);
            vec![point.year.to_string(), point.value.to_string(), growth]
        })
        .collect()
}

fn conclusion(report: &Report, keyword: &str) -> String {
    let mut text = format!(
        "The {keyword} market is estimated at {} and is growing at {}.",
        report.market_size, report.growth_rate
    );
    if let Some(opportunity) = report.opportunities.first() {
        text.push_str(&format!(" The most promising opportunity: {opportunity}."));
    }
    if let Some(challenge) = report.challenges.first() {
        text.push_str(&format!(" The main challenge to plan for: {challenge}."));
    }
    text
}

pub fn file_name(keyword: &str) -> String {
    let slug: String = keyword
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!("{slug}-market-report.pdf")
}

fn is_image_data_uri(value: &str) -> bool {
    value
        .strip_prefix("data:image/")
        .and_then(|rest| rest.split_once(";base64,"))
        .is_some_and(|(mime, payload)| !mime.is_empty() && !payload.is_empty())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::report::enhance_at;

    const PNG: &str = "data:image/png;base64,iVBORw0KGgo=";

    fn report() -> Report {
        enhance_at(
            &json!({
                "title": "E-Bike Market 2025",
                "summary": "Strong growth.",
                "marketSize": "$40 billion",
                "growthRate": "9% CAGR",
                "keyPlayers": ["Giant", "Trek"],
                "trends": ["AI-assisted motors"],
                "challenges": ["Battery regulation"],
                "opportunities": ["Urban commuting"],
                "forecastData": [
                    {"year": 2025, "value": 40},
                    {"year": 2026, "value": 44},
                    {"year": 2027, "value": 0},
                    {"year": 2028, "value": 10}
                ]
            }),
            2025,
        )
    }

    fn all_charts() -> HashMap<String, String> {
        [KEY_PLAYERS_CHART, SEGMENTS_CHART, REGIONS_CHART, FORECAST_CHART]
            .into_iter()
            .map(|id| (id.to_string(), PNG.to_string()))
            .collect()
    }

    fn chart_ids(doc: &ExportDocument) -> Vec<&str> {
        doc.pages
            .iter()
            .flat_map(|p| &p.blocks)
            .filter_map(|b| match b {
                Block::Chart { element_id, .. } => Some(element_id.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_page_order() {
        let doc = build_document(&report(), "E-Bikes", &all_charts());
        let titles: Vec<&str> = doc.pages.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "E-Bike Market 2025",
                "Key Players",
                "Market Dynamics",
                "SWOT Analysis",
                "Market Segments",
                "Regional Analysis",
                "Market Forecast",
                "Conclusion",
            ]
        );
        assert_eq!(
            chart_ids(&doc),
            vec![KEY_PLAYERS_CHART, SEGMENTS_CHART, REGIONS_CHART, FORECAST_CHART]
        );
    }

    #[test]
    fn test_growth_rows() {
        let rows = growth_rows(&report().forecast_data);
        let growth: Vec<&str> = rows.iter().map(|r| r[2].as_str()).collect();
        assert_eq!(growth, vec!["-", "10.0%", "-100.0%", "N/A"]);
        assert_eq!(rows[0][0], "2025");
        assert_eq!(rows[1][1], "44");
    }

    #[test]
    fn test_growth_rows_empty() {
        assert!(growth_rows(&[]).is_empty());
    }

    #[test]
    fn test_missing_and_invalid_charts_are_skipped() {
        let mut charts = HashMap::new();
        charts.insert(SEGMENTS_CHART.to_string(), PNG.to_string());
        charts.insert(REGIONS_CHART.to_string(), "not an image".to_string());
        charts.insert(FORECAST_CHART.to_string(), "data:image/png;base64,".to_string());

        let doc = build_document(&report(), "E-Bikes", &charts);
        assert_eq!(doc.pages.len(), 8);
        assert_eq!(chart_ids(&doc), vec![SEGMENTS_CHART]);

        let forecast = &doc.pages[6];
        assert!(forecast.blocks.iter().any(|b| matches!(b, Block::Table { .. })));
    }

    #[test]
    fn test_swot_colors() {
        let doc = build_document(&report(), "E-Bikes", &HashMap::new());
        let colors: Vec<SwotColor> = doc.pages[3]
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::SwotQuadrant { color, .. } => Some(*color),
                _ => None,
            })
            .collect();
        assert_eq!(
            colors,
            vec![SwotColor::Green, SwotColor::Red, SwotColor::Blue, SwotColor::Orange]
        );
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("Electric Bikes"), "Electric-Bikes-market-report.pdf");
        assert_eq!(file_name("AI/ML tools"), "AI-ML-tools-market-report.pdf");
    }

    #[test]
    fn test_is_image_data_uri() {
        assert!(is_image_data_uri(PNG));
        assert!(!is_image_data_uri("data:text/plain;base64,aGk="));
        assert!(!is_image_data_uri("data:image/;base64,aGk="));
        assert!(!is_image_data_uri(""));
    }

    #[test]
    fn test_block_serialization_tag() {
        let block = Block::Paragraph { text: "hi".to_string() };
        assert_eq!(
            serde_json::to_value(&block).unwrap(),
            json!({"type": "paragraph", "text": "hi"})
        );
    }

    #[test]
    fn test_conclusion_mentions_keyword() {
        let text = conclusion(&report(), "E-Bikes");
        assert!(text.starts_with("The E-Bikes market is estimated at $40 billion"));
        assert!(text.contains("Urban commuting"));
    }
}
