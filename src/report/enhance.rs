use chrono::{Datelike, Utc};
use opentelemetry::KeyValue;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::coerce::{self, format_number};
use super::model::{KeyPlayer, MarketShare, Report, Swot, YearValue};
use super::sections::{competitors, consumer, regulatory, technology};
use crate::telemetry::metrics::REPORT_SECTIONS_DISCARDED;

const DEFAULT_TITLE: &str = "Market Research Report";
const DEFAULT_WEIGHT: f64 = 10.0;
const TOP_RANK_SHARE: f64 = 30.0;
const RANK_SHARE_STEP: f64 = 5.0;
const MIN_RANK_SHARE: f64 = 5.0;

/// Normalizes a raw report and fills in any missing derived sections.
///
/// Accepts anything: non-object input is treated as an empty report, and
/// every malformed field falls back to a default. Sections that are already
/// present and well-formed are returned untouched, so enhancing an enhanced
/// report is a no-op.
pub fn enhance(raw: &Value) -> Report {
    enhance_at(raw, Utc::now().year())
}

/// [`enhance`] with an explicit calendar year, used for forecast points that
/// lack one and as the start of the synthesized adoption timeline.
pub fn enhance_at(raw: &Value, current_year: i32) -> Report {
    let empty = Map::new();
    let obj = raw.as_object().unwrap_or(&empty);

    let key_players_data = key_players_data(obj);
    let mut key_players = coerce::string_list(obj.get("keyPlayers"));
    if key_players.is_empty() {
        key_players = key_players_data.iter().map(|p| p.name.clone()).collect();
    }

    let trends = coerce::string_list(obj.get("trends"));
    let challenges = coerce::string_list(obj.get("challenges"));
    let opportunities = coerce::string_list(obj.get("opportunities"));
    let forecast_data = forecast_data(obj.get("forecastData"), current_year);

    let consumer_data = existing_section(obj, "consumerData").unwrap_or_else(|| {
        tracing::debug!(section = "consumerData", "Synthesizing report section");
        consumer::synthesize(&trends)
    });

    let technology_data = existing_section(obj, "technologyData").unwrap_or_else(|| {
        tracing::debug!(section = "technologyData", "Synthesizing report section");
        let base_year = forecast_data.first().map_or(current_year, |p| p.year);
        technology::synthesize(&trends, &opportunities, base_year)
    });

    let regulatory_data = existing_section(obj, "regulatoryData").unwrap_or_else(|| {
        tracing::debug!(section = "regulatoryData", "Synthesizing report section");
        regulatory::synthesize(&challenges, &trends)
    });

    let competitors_data = existing_section(obj, "competitorsData").unwrap_or_else(|| {
        tracing::debug!(section = "competitorsData", "Synthesizing report section");
        competitors::synthesize(&key_players_data)
    });

    Report {
        title: coerce::text(obj.get("title")).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        summary: coerce::text(obj.get("summary")).unwrap_or_default(),
        market_size: coerce::market_figure(obj.get("marketSize")).unwrap_or_default(),
        growth_rate: coerce::market_figure(obj.get("growthRate")).unwrap_or_default(),
        forecast: coerce::market_figure(obj.get("forecast")).unwrap_or_default(),
        key_players,
        key_players_data,
        segments: market_shares(obj.get("segments"), "Segment"),
        regions: market_shares(obj.get("regions"), "Region"),
        trends,
        challenges,
        opportunities,
        forecast_data,
        swot: swot(obj.get("swot")),
        consumer_data,
        technology_data,
        regulatory_data,
        competitors_data,
    }
}

fn rank_share(index: usize) -> f64 {
    (TOP_RANK_SHARE - RANK_SHARE_STEP * index as f64).max(MIN_RANK_SHARE)
}

/// Uses `keyPlayersData` when it has entries, otherwise derives it from the
/// `keyPlayers` name list with descending rank shares.
fn key_players_data(obj: &Map<String, Value>) -> Vec<KeyPlayer> {
    let entries: Vec<&Value> = coerce::array(obj.get("keyPlayersData"))
        .iter()
        .filter(|v| !coerce::is_falsy(v))
        .collect();

    if entries.is_empty() {
        return coerce::string_list(obj.get("keyPlayers"))
            .into_iter()
            .enumerate()
            .map(|(i, name)| KeyPlayer {
                name,
                share: rank_share(i),
            })
            .collect();
    }

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(i, entry)| match entry {
            Value::Object(player) => Some(KeyPlayer {
                name: coerce::text(player.get("name"))
                    .unwrap_or_else(|| format!("Company {}", i + 1)),
                share: coerce::number(player.get("share")).unwrap_or_else(|| rank_share(i)),
            }),
            other => coerce::list_entry(other).map(|name| KeyPlayer {
                name,
                share: rank_share(i),
            }),
        })
        .collect()
}

fn market_shares(value: Option<&Value>, label: &str) -> Vec<MarketShare> {
    coerce::array(value)
        .iter()
        .enumerate()
        .map(|(i, entry)| market_share(entry, label, i))
        .collect()
}

fn market_share(entry: &Value, label: &str, index: usize) -> MarketShare {
    let placeholder = || MarketShare {
        name: format!("{label} {}", index + 1),
        description: String::new(),
        share: format!("{}%", format_number(DEFAULT_WEIGHT)),
        value: DEFAULT_WEIGHT,
    };

    match entry {
        Value::Object(obj) => {
            let share = match obj.get("share") {
                Some(Value::Number(n)) => n
                    .as_f64()
                    .filter(|f| f.is_finite())
                    .map(|f| format!("{}%", format_number(f))),
                other => coerce::text(other),
            };
            let value = coerce::number(obj.get("value"))
                .or_else(|| {
                    share
                        .as_deref()
                        .and_then(coerce::leading_integer)
                        .map(|n| n as f64)
                })
                .unwrap_or(DEFAULT_WEIGHT);

            MarketShare {
                name: coerce::text(obj.get("name")).unwrap_or_else(|| placeholder().name),
                description: coerce::text(obj.get("description")).unwrap_or_default(),
                share: share.unwrap_or_else(|| format!("{}%", format_number(value))),
                value,
            }
        }
        Value::String(name) if !name.is_empty() => MarketShare {
            name: name.clone(),
            ..placeholder()
        },
        _ => placeholder(),
    }
}

fn forecast_data(value: Option<&Value>, current_year: i32) -> Vec<YearValue> {
    let mut points: Vec<YearValue> = coerce::array(value)
        .iter()
        .filter_map(|entry| {
            let obj = entry.as_object()?;
            let year = coerce::number(obj.get("year"))
                .map(f64::trunc)
                .filter(|y| *y >= f64::from(i32::MIN) && *y <= f64::from(i32::MAX))
                .map(|y| y as i32);
            let value = coerce::number(obj.get("value"));
            if year.is_none() && value.is_none() {
                return None;
            }
            Some(YearValue {
                year: year.unwrap_or(current_year),
                value: value.unwrap_or(0.0),
            })
        })
        .collect();

    points.sort_by_key(|p| p.year);
    points
}

fn swot(value: Option<&Value>) -> Swot {
    let Some(obj) = value.and_then(Value::as_object) else {
        return Swot::default();
    };
    Swot {
        strengths: coerce::string_list(obj.get("strengths")),
        weaknesses: coerce::string_list(obj.get("weaknesses")),
        opportunities: coerce::string_list(obj.get("opportunities")),
        threats: coerce::string_list(obj.get("threats")),
    }
}

/// A derived section is kept only when it deserializes in full; a partial one
/// is discarded (and counted) so the caller synthesizes the whole section
/// instead.
fn existing_section<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str) -> Option<T> {
    let value = obj.get(key).filter(|v| !v.is_null())?;
    match serde_json::from_value(value.clone()) {
        Ok(section) => Some(section),
        Err(e) => {
            tracing::warn!(section = key, error = %e, "Discarding malformed report section");
            REPORT_SECTIONS_DISCARDED.add(1, &[KeyValue::new("section", key.to_string())]);
            None
        }
    }
}
