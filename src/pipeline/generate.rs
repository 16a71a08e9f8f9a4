use std::fmt;

use opentelemetry::KeyValue;
use serde_json::Value;

use crate::llm::{GenerateRequest, LlmClient};
use crate::report::SampleReport;
use crate::telemetry::metrics::REPORT_SAMPLE_FALLBACK;

const SYSTEM_PROMPT: &str = "You are a senior market research analyst. \
    Write specific, data-driven market reports with realistic figures. \
    Respond with a single JSON object and nothing else.";

/// What a report is about: a market keyword or a company/product URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    Keyword(String),
    Url(String),
}

impl Subject {
    pub fn label(&self) -> &str {
        match self {
            Subject::Keyword(k) => k,
            Subject::Url(u) => u,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Keyword(k) => write!(f, "the {k} market"),
            Subject::Url(u) => write!(f, "the market served by the business at {u}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    Llm,
    Sample,
}

#[derive(Debug, Clone)]
pub struct GeneratedContent {
    pub content: Value,
    pub source: ContentSource,
}

/// Generates raw report content for `subject` in `area`. Any failure
/// (no configured provider, provider error, unusable response) is logged and
/// answered with the sample report; this function never fails.
#[tracing::instrument(
    name = "pipeline_stage generate",
    skip(llm_client, settings, sample),
    fields(
        pipeline.stage = "generate",
        report.subject = %subject.label(),
        report.source,
    )
)]
pub async fn generate_content(
    llm_client: Option<&LlmClient>,
    settings: &GenerationSettings,
    sample: &SampleReport,
    subject: &Subject,
    area: &str,
) -> GeneratedContent {
    let span = tracing::Span::current();

    let result = match llm_client {
        Some(client) => request_report(client, settings, subject, area).await,
        None => Err(FallbackReason::MissingCredentials),
    };

    match result {
        Ok(content) => {
            span.record("report.source", "llm");
            GeneratedContent {
                content,
                source: ContentSource::Llm,
            }
        }
        Err(reason) => {
            tracing::warn!(
                reason = reason.as_str(),
                subject = %subject.label(),
                area = %area,
                "Report generation failed, serving sample report"
            );
            REPORT_SAMPLE_FALLBACK.add(1, &[KeyValue::new("reason", reason.as_str())]);
            span.record("report.source", "sample");
            GeneratedContent {
                content: sample.for_request(subject.label(), area),
                source: ContentSource::Sample,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FallbackReason {
    MissingCredentials,
    ProviderError,
    InvalidResponse,
}

impl FallbackReason {
    fn as_str(self) -> &'static str {
        match self {
            FallbackReason::MissingCredentials => "missing_credentials",
            FallbackReason::ProviderError => "provider_error",
            FallbackReason::InvalidResponse => "invalid_response",
        }
    }
}

async fn request_report(
    client: &LlmClient,
    settings: &GenerationSettings,
    subject: &Subject,
    area: &str,
) -> Result<Value, FallbackReason> {
    let resp = client
        .generate(&GenerateRequest {
            model: settings.model.clone(),
            system: SYSTEM_PROMPT.to_string(),
            prompt: build_prompt(subject, area),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            operation: "generate_report".to_string(),
        })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "LLM report request failed");
            FallbackReason::ProviderError
        })?;

    parse_report_content(&resp.content).ok_or_else(|| {
        tracing::error!(
            preview = %resp.content.chars().take(200).collect::<String>(),
            "LLM response did not contain a JSON report"
        );
        FallbackReason::InvalidResponse
    })
}

fn build_prompt(subject: &Subject, area: &str) -> String {
    format!(
        "Write a market research report on {subject} in {area}.\n\n\
        Return JSON with this exact structure:\n\
        {{\n  \"title\": \"...\",\n  \"summary\": \"3-4 sentence overview\",\n  \
        \"marketSize\": \"e.g. $12.3 billion\",\n  \"growthRate\": \"e.g. 7.5% CAGR\",\n  \
        \"forecast\": \"...\",\n  \
        \"keyPlayers\": [\"Company\"],\n  \
        \"keyPlayersData\": [{{\"name\": \"Company\", \"share\": 25}}],\n  \
        \"segments\": [{{\"name\": \"...\", \"description\": \"...\", \"share\": \"35%\"}}],\n  \
        \"regions\": [{{\"name\": \"...\", \"description\": \"...\", \"share\": \"40%\"}}],\n  \
        \"trends\": [\"...\"],\n  \"challenges\": [\"...\"],\n  \"opportunities\": [\"...\"],\n  \
        \"forecastData\": [{{\"year\": 2025, \"value\": 12.3}}],\n  \
        \"swot\": {{\"strengths\": [], \"weaknesses\": [], \"opportunities\": [], \"threats\": []}}\n}}\n\n\
        Use 4-6 key players, 3-5 segments and regions, 5 trends, and one forecast point per year for the next 5 years."
    )
}

fn parse_report_content(content: &str) -> Option<Value> {
    let json_str = extract_json(content);
    serde_json::from_str::<Value>(&json_str)
        .ok()
        .filter(Value::is_object)
}

fn extract_json(content: &str) -> String {
    if let Some(start) = content.find("```json")
        && let Some(end) = content[start + 7..].find("```")
    {
        return content[start + 7..start + 7 + end].trim().to_string();
    }
    if let Some(start) = content.find("```")
        && let Some(end) = content[start + 3..].find("```")
    {
        let inner = content[start + 3..start + 3 + end].trim();
        if inner.starts_with('{') {
            return inner.to_string();
        }
    }
    if let Some(start) = content.find('{')
        && let Some(end) = content.rfind('}')
        && start < end
    {
        return content[start..=end].to_string();
    }
    content.to_string()
}
