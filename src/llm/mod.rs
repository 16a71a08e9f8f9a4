pub mod anthropic;
pub mod client;
pub mod openai;
pub mod pricing;

use std::sync::Arc;

pub use client::LlmClient;

use crate::config::Config;

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub operation: String,
}

#[derive(Debug, Clone)]
pub struct GenerateResponse {
    pub content: String,
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub cost_usd: f64,
    pub finish_reason: String,
    pub provider: String,
}

#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    async fn generate(&self, req: &GenerateRequest) -> anyhow::Result<GenerateResponse>;
    fn name(&self) -> &str;
}

/// Builds the named provider, or `None` when its credentials are missing.
pub fn build_provider(name: &str, config: &Config) -> Option<Arc<dyn Provider>> {
    let api_key = config.api_key_for(name)?;
    let provider: Arc<dyn Provider> = match name {
        "anthropic" => Arc::new(anthropic::AnthropicProvider::new(api_key)),
        "google" => Arc::new(openai::OpenAIProvider::new_google(api_key)),
        "ollama" => Arc::new(openai::OpenAIProvider::new_ollama(&config.ollama_base_url)),
        _ => Arc::new(openai::OpenAIProvider::new(api_key)),
    };
    Some(provider)
}

/// The configured LLM client, or `None` when the primary provider has no
/// credentials. Report generation then serves the sample report.
pub fn build_client(config: &Config) -> Option<LlmClient> {
    let Some(primary) = build_provider(&config.llm_provider, config) else {
        tracing::warn!(
            provider = %config.llm_provider,
            "No credentials for LLM provider, reports will use sample data"
        );
        return None;
    };

    let fallback = match config.fallback_provider.as_str() {
        "" | "none" => None,
        name if name == config.llm_provider => None,
        name => build_provider(name, config),
    };

    tracing::info!(
        primary_provider = %config.llm_provider,
        fallback_provider = %config.fallback_provider,
        fallback_enabled = fallback.is_some(),
        "LLM client initialized"
    );

    Some(LlmClient {
        primary,
        fallback,
        primary_provider: config.llm_provider.clone(),
        fallback_provider: config.fallback_provider.clone(),
        fallback_model: config.fallback_model.clone(),
        max_retries: config.llm_max_retries.max(1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_client_without_credentials() {
        let mut config = Config::for_tests();
        config.openai_api_key = None;
        assert!(build_client(&config).is_none());
    }

    #[test]
    fn test_build_client_skips_fallback_without_key() {
        let config = Config::for_tests();
        let client = build_client(&config).unwrap();
        assert_eq!(client.primary.name(), "openai");
        assert!(client.fallback.is_none());
        assert_eq!(client.max_retries, 3);
    }

    #[test]
    fn test_build_client_with_fallback() {
        let mut config = Config::for_tests();
        config.anthropic_api_key = Some("sk-ant".to_string());
        config.llm_max_retries = 0;
        let client = build_client(&config).unwrap();
        assert_eq!(client.fallback.as_ref().map(|f| f.name()), Some("anthropic"));
        assert_eq!(client.max_retries, 1);
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let mut config = Config::for_tests();
        config.llm_provider = "ollama".to_string();
        config.openai_api_key = None;
        let client = build_client(&config).unwrap();
        assert_eq!(client.primary.name(), "ollama");
    }
}
