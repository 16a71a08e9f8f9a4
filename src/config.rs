use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: String,
    pub database_url: String,
    pub llm_provider: String,
    pub llm_model: String,
    pub fallback_provider: String,
    pub fallback_model: String,
    pub llm_max_retries: u32,
    pub ollama_base_url: String,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub google_api_key: Option<String>,
    pub sample_report_path: Option<String>,
    pub default_geographic_area: String,
    pub otel_service_name: String,
    pub otel_exporter_endpoint: String,
    pub default_temperature: f32,
    pub default_max_tokens: u32,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            port: env::var("APP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("APP_PORT must be a number"),
            environment: env::var("APP_ENV")
                .unwrap_or_else(|_| "development".to_string()),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            llm_provider: env::var("LLM_PROVIDER").unwrap_or_else(|_| "openai".to_string()),
            llm_model: env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4.1-mini".to_string()),
            fallback_provider: env::var("FALLBACK_PROVIDER")
                .unwrap_or_else(|_| "anthropic".to_string()),
            fallback_model: env::var("FALLBACK_MODEL")
                .unwrap_or_else(|_| "claude-haiku-4-5-20251001".to_string()),
            llm_max_retries: env::var("LLM_MAX_RETRIES")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .expect("LLM_MAX_RETRIES must be a number"),
            ollama_base_url: env::var("OLLAMA_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            openai_api_key: non_empty("OPENAI_API_KEY"),
            anthropic_api_key: non_empty("ANTHROPIC_API_KEY"),
            google_api_key: non_empty("GOOGLE_API_KEY"),
            sample_report_path: non_empty("SAMPLE_REPORT_PATH"),
            default_geographic_area: env::var("DEFAULT_GEOGRAPHIC_AREA")
                .unwrap_or_else(|_| "Global".to_string()),
            otel_service_name: env::var("OTEL_SERVICE_NAME")
                .unwrap_or_else(|_| "market-report-service".to_string()),
            otel_exporter_endpoint: env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:4317".to_string()),
            default_temperature: env::var("DEFAULT_TEMPERATURE")
                .unwrap_or_else(|_| "0.7".to_string())
                .parse()
                .expect("DEFAULT_TEMPERATURE must be a number"),
            default_max_tokens: env::var("DEFAULT_MAX_TOKENS")
                .unwrap_or_else(|_| "4096".to_string())
                .parse()
                .expect("DEFAULT_MAX_TOKENS must be a number"),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// The API key the given provider needs. Ollama runs without one.
    pub fn api_key_for(&self, provider: &str) -> Option<&str> {
        match provider {
            "anthropic" => self.anthropic_api_key.as_deref(),
            "google" => self.google_api_key.as_deref(),
            "ollama" => Some(""),
            _ => self.openai_api_key.as_deref(),
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            port: 8080,
            environment: "development".to_string(),
            database_url: "postgres://localhost/reports".to_string(),
            llm_provider: "openai".to_string(),
            llm_model: "gpt-4.1-mini".to_string(),
            fallback_provider: "anthropic".to_string(),
            fallback_model: "claude-haiku-4-5-20251001".to_string(),
            llm_max_retries: 3,
            ollama_base_url: "http://localhost:11434".to_string(),
            openai_api_key: Some("sk-test".to_string()),
            anthropic_api_key: None,
            google_api_key: None,
            sample_report_path: None,
            default_geographic_area: "Global".to_string(),
            otel_service_name: "market-report-service".to_string(),
            otel_exporter_endpoint: "http://localhost:4317".to_string(),
            default_temperature: 0.7,
            default_max_tokens: 4096,
        }
    }
}
