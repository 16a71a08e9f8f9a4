use serde::Deserialize;
use std::collections::HashMap;
use std::sync::LazyLock;

#[derive(Debug, Deserialize, Clone)]
pub struct PriceEntry {
    #[allow(dead_code)]
    pub provider: String,
    pub input: f64,
    pub output: f64,
}

#[derive(Deserialize)]
struct PricingFile {
    models: HashMap<String, PriceEntry>,
}

const BUNDLED_PRICING: &str = include_str!("../../data/pricing.json");

/// Per-million-token prices. `PRICING_JSON_PATH` overrides the bundled table.
pub static PRICING: LazyLock<HashMap<String, PriceEntry>> = LazyLock::new(|| {
    if let Ok(path) = std::env::var("PRICING_JSON_PATH") {
        match std::fs::read_to_string(&path).map(|data| parse_pricing(&data)) {
            Ok(Some(models)) => return models,
            _ => tracing::warn!(path = %path, "Unusable pricing file, using bundled prices"),
        }
    }
    parse_pricing(BUNDLED_PRICING).unwrap_or_else(|| {
        tracing::warn!("Bundled pricing table is empty, costs will be $0.00");
        HashMap::new()
    })
});

fn parse_pricing(data: &str) -> Option<HashMap<String, PriceEntry>> {
    serde_json::from_str::<PricingFile>(data)
        .ok()
        .map(|file| file.models)
        .filter(|models| !models.is_empty())
}

pub fn calculate_cost(model: &str, input_tokens: u32, output_tokens: u32) -> f64 {
    match PRICING.get(model) {
        Some(entry) => {
            (f64::from(input_tokens) * entry.input / 1_000_000.0)
                + (f64::from(output_tokens) * entry.output / 1_000_000.0)
        }
        None => 0.0,
    }
}

/// Host and port reported as `server.address` / `server.port` on chat spans.
pub fn provider_endpoint(provider: &str) -> (&'static str, i64) {
    match provider {
        "openai" => ("api.openai.com", 443),
        "anthropic" => ("api.anthropic.com", 443),
        "google" => ("generativelanguage.googleapis.com", 443),
        "ollama" => ("localhost", 11434),
        _ => ("unknown", 443),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_pricing_parses() {
        let models = parse_pricing(BUNDLED_PRICING).unwrap();
        assert!(models.contains_key("gpt-4.1-mini"));
        assert!(models.contains_key("claude-haiku-4-5-20251001"));
    }

    #[test]
    fn test_parse_pricing_rejects_empty() {
        assert!(parse_pricing(r#"{"models": {}}"#).is_none());
        assert!(parse_pricing("not json").is_none());
    }

    #[test]
    fn test_calculate_cost_known_model() {
        let cost = calculate_cost("gpt-4.1-mini", 1_000_000, 1_000_000);
        assert!(cost > 0.0, "cost should be positive for known model");
    }

    #[test]
    fn test_calculate_cost_unknown_model() {
        let cost = calculate_cost("nonexistent-model-xyz", 1000, 1000);
        assert_eq!(cost, 0.0);
    }

    #[test]
    fn test_calculate_cost_zero_tokens() {
        let cost = calculate_cost("gpt-4.1-mini", 0, 0);
        assert_eq!(cost, 0.0);
    }

    #[test]
    fn test_provider_endpoint() {
        assert_eq!(provider_endpoint("openai"), ("api.openai.com", 443));
        assert_eq!(provider_endpoint("anthropic"), ("api.anthropic.com", 443));
        assert_eq!(provider_endpoint("ollama"), ("localhost", 11434));
        assert_eq!(provider_endpoint("mistral").0, "unknown");
    }

    #[test]
    fn test_sample_pricing_model_is_priced() {
        let entry = PRICING.get("gpt-4.1-mini").unwrap();
        assert!(entry.output >= entry.input);
    }
}
