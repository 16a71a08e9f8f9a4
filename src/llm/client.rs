use std::sync::Arc;
use std::time::{Duration, Instant};

use opentelemetry::KeyValue;
use tracing::{Instrument, Span};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use super::pricing::{calculate_cost, provider_endpoint};
use super::{GenerateRequest, GenerateResponse, Provider};
use crate::telemetry::metrics::{
    GEN_AI_COST, GEN_AI_ERROR_COUNT, GEN_AI_FALLBACK_COUNT, GEN_AI_OPERATION_DURATION,
    GEN_AI_RETRY_COUNT, GEN_AI_TOKEN_USAGE,
};

const MAX_BACKOFF: Duration = Duration::from_secs(10);

pub struct LlmClient {
    pub primary: Arc<dyn Provider>,
    pub fallback: Option<Arc<dyn Provider>>,
    pub primary_provider: String,
    pub fallback_provider: String,
    pub fallback_model: String,
    pub max_retries: u32,
}

impl LlmClient {
    pub async fn generate_once(
        &self,
        provider: &dyn Provider,
        provider_name: &str,
        req: &GenerateRequest,
    ) -> anyhow::Result<GenerateResponse> {
        let start = Instant::now();
        let span = chat_span(provider_name, req);

        let mut user_event_attrs = vec![KeyValue::new("gen_ai.prompt", truncate(&req.prompt, 1000))];
        if !req.system.is_empty() {
            user_event_attrs.push(KeyValue::new(
                "gen_ai.system_instructions",
                truncate(&req.system, 500),
            ));
        }
        span.add_event("gen_ai.user.message", user_event_attrs);

        let result = provider.generate(req).instrument(span.clone()).await;
        let duration = start.elapsed().as_secs_f64();

        match result {
            Ok(mut resp) => {
                resp.provider = provider_name.to_string();
                resp.cost_usd = calculate_cost(&resp.model, resp.input_tokens, resp.output_tokens);
                record_success(&span, provider_name, &resp, duration);
                Ok(resp)
            }
            Err(err) => {
                span.record("otel.status_code", "ERROR");
                span.record("error.type", classify_error(&err));

                GEN_AI_ERROR_COUNT.add(
                    1,
                    &[
                        KeyValue::new("gen_ai.provider.name", provider_name.to_string()),
                        KeyValue::new("gen_ai.request.model", req.model.clone()),
                    ],
                );

                Err(err)
            }
        }
    }

    pub async fn generate_with_retry(
        &self,
        provider: &dyn Provider,
        provider_name: &str,
        req: &GenerateRequest,
    ) -> anyhow::Result<GenerateResponse> {
        let mut last_err = None;

        for attempt in 0..self.max_retries {
            match self.generate_once(provider, provider_name, req).await {
                Ok(resp) => return Ok(resp),
                Err(err) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        provider = provider_name,
                        model = %req.model,
                        error = %err,
                        "LLM call failed"
                    );

                    if attempt > 0 {
                        GEN_AI_RETRY_COUNT.add(
                            1,
                            &[
                                KeyValue::new("gen_ai.provider.name", provider_name.to_string()),
                                KeyValue::new("gen_ai.request.model", req.model.clone()),
                            ],
                        );
                    }

                    last_err = Some(err);

                    if attempt + 1 < self.max_retries {
                        tokio::time::sleep(backoff_delay(attempt)).await;
                    }
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("all retries exhausted")))
    }

    /// Calls the primary provider, then the fallback provider (with the
    /// fallback model) once the primary has exhausted its retries.
    pub async fn generate(&self, req: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        let primary_err = match self
            .generate_with_retry(self.primary.as_ref(), &self.primary_provider, req)
            .await
        {
            Ok(resp) => return Ok(resp),
            Err(err) => err,
        };

        let Some(fallback) = &self.fallback else {
            return Err(anyhow::anyhow!(
                "primary provider {} failed after retries: {}",
                self.primary_provider,
                primary_err
            ));
        };

        tracing::warn!(
            primary_provider = %self.primary_provider,
            fallback_provider = %self.fallback_provider,
            error = %primary_err,
            "Primary provider failed, falling back"
        );
        GEN_AI_FALLBACK_COUNT.add(1, &[]);

        let fallback_req = GenerateRequest {
            model: self.fallback_model.clone(),
            ..req.clone()
        };
        self.generate_with_retry(fallback.as_ref(), &self.fallback_provider, &fallback_req)
            .await
    }
}

fn chat_span(provider_name: &str, req: &GenerateRequest) -> Span {
    let (server_addr, server_port) = provider_endpoint(provider_name);

    tracing::info_span!(
        "gen_ai.chat",
        otel.name = %format!("gen_ai.chat {}", req.model),
        gen_ai.operation.name = "chat",
        gen_ai.provider.name = %provider_name,
        gen_ai.request.model = %req.model,
        server.address = %server_addr,
        server.port = server_port,
        gen_ai.request.temperature = req.temperature,
        gen_ai.request.max_tokens = req.max_tokens as i64,
        gen_ai.response.model = tracing::field::Empty,
        gen_ai.usage.input_tokens = tracing::field::Empty,
        gen_ai.usage.output_tokens = tracing::field::Empty,
        gen_ai.usage.cost_usd = tracing::field::Empty,
        gen_ai.response.finish_reasons = tracing::field::Empty,
        report.operation = %req.operation,
        otel.status_code = tracing::field::Empty,
        error.type = tracing::field::Empty,
    )
}

fn record_success(span: &Span, provider_name: &str, resp: &GenerateResponse, duration: f64) {
    span.record("gen_ai.response.model", resp.model.as_str());
    span.record("gen_ai.usage.input_tokens", resp.input_tokens as i64);
    span.record("gen_ai.usage.output_tokens", resp.output_tokens as i64);
    span.record("gen_ai.usage.cost_usd", resp.cost_usd);
    if !resp.finish_reason.is_empty() {
        span.record(
            "gen_ai.response.finish_reasons",
            resp.finish_reason.as_str(),
        );
    }
    span.add_event(
        "gen_ai.assistant.message",
        vec![KeyValue::new(
            "gen_ai.completion",
            truncate(&resp.content, 2000),
        )],
    );

    let attrs = [
        KeyValue::new("gen_ai.operation.name", "chat"),
        KeyValue::new("gen_ai.provider.name", provider_name.to_string()),
        KeyValue::new("gen_ai.request.model", resp.model.clone()),
    ];
    let with_token_type = |token_type: &'static str| {
        let mut kv = vec![KeyValue::new("gen_ai.token.type", token_type)];
        kv.extend(attrs.iter().cloned());
        kv
    };

    GEN_AI_TOKEN_USAGE.record(f64::from(resp.input_tokens), &with_token_type("input"));
    GEN_AI_TOKEN_USAGE.record(f64::from(resp.output_tokens), &with_token_type("output"));
    GEN_AI_OPERATION_DURATION.record(duration, &attrs);
    GEN_AI_COST.add(resp.cost_usd, &attrs);
}

/// Exponential backoff (1s, 2s, 4s, ... capped at 10s) plus up to 25% jitter.
fn backoff_delay(attempt: u32) -> Duration {
    let base = Duration::from_secs(1)
        .saturating_mul(2u32.saturating_pow(attempt))
        .min(MAX_BACKOFF);
    let jitter_ms = fastrand::u64(0..=base.as_millis() as u64 / 4);
    base + Duration::from_millis(jitter_ms)
}

fn classify_error(err: &anyhow::Error) -> &'static str {
    let msg = err.to_string().to_lowercase();
    if msg.contains("rate limit") || msg.contains("429") {
        "rate_limit"
    } else if msg.contains("timeout") || msg.contains("timed out") || msg.contains("deadline") {
        "timeout"
    } else if msg.contains("401")
        || msg.contains("403")
        || msg.contains("auth")
        || msg.contains("api key")
    {
        "auth_error"
    } else if msg.contains("400") || msg.contains("422") || msg.contains("invalid") {
        "invalid_request"
    } else if msg.contains("500")
        || msg.contains("502")
        || msg.contains("503")
        || msg.contains("server")
    {
        "server_error"
    } else if msg.contains("connect")
        || msg.contains("dns")
        || msg.contains("network")
        || msg.contains("reset")
    {
        "network_error"
    } else {
        "unknown_error"
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        s.char_indices()
            .take_while(|&(i, c)| i + c.len_utf8() <= max)
            .map(|(_, c)| c)
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Replays canned results in order; repeats the last one when exhausted.
    pub(crate) struct ScriptedProvider {
        name: String,
        script: Mutex<Vec<Result<String, String>>>,
        pub calls: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        pub(crate) fn new(name: &str, script: Vec<Result<&str, &str>>) -> Self {
            Self {
                name: name.to_string(),
                script: Mutex::new(
                    script
                        .into_iter()
                        .rev()
                        .map(|r| r.map(str::to_string).map_err(str::to_string))
                        .collect(),
                ),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl Provider for ScriptedProvider {
        async fn generate(&self, req: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
            self.calls.lock().unwrap().push(req.model.clone());
            let mut script = self.script.lock().unwrap();
            let next = if script.len() > 1 {
                script.pop().unwrap()
            } else {
                script.last().cloned().unwrap_or(Err("empty script".to_string()))
            };
            match next {
                Ok(content) => Ok(GenerateResponse {
                    content,
                    model: req.model.clone(),
                    input_tokens: 10,
                    output_tokens: 20,
                    cost_usd: 0.0,
                    finish_reason: "stop".to_string(),
                    provider: String::new(),
                }),
                Err(msg) => Err(anyhow::anyhow!(msg)),
            }
        }

        fn name(&self) -> &str {
            &self.name
        }
    }

    pub(crate) fn client(
        primary: Arc<ScriptedProvider>,
        fallback: Option<Arc<ScriptedProvider>>,
    ) -> LlmClient {
        LlmClient {
            primary,
            fallback: fallback.map(|f| f as Arc<dyn Provider>),
            primary_provider: "openai".to_string(),
            fallback_provider: "anthropic".to_string(),
            fallback_model: "fallback-model".to_string(),
            max_retries: 1,
        }
    }

    pub(crate) fn request() -> GenerateRequest {
        GenerateRequest {
            model: "primary-model".to_string(),
            system: String::new(),
            prompt: "Describe the market".to_string(),
            temperature: 0.7,
            max_tokens: 256,
            operation: "generate_report".to_string(),
        }
    }

    #[tokio::test]
    async fn test_generate_uses_primary() {
        let primary = Arc::new(ScriptedProvider::new("openai", vec![Ok("{}")]));
        let client = client(primary.clone(), None);

        let resp = client.generate(&request()).await.unwrap();
        assert_eq!(resp.content, "{}");
        assert_eq!(resp.provider, "openai");
        assert_eq!(*primary.calls.lock().unwrap(), vec!["primary-model"]);
    }

    #[tokio::test]
    async fn test_generate_falls_back_with_fallback_model() {
        let primary = Arc::new(ScriptedProvider::new("openai", vec![Err("503 unavailable")]));
        let fallback = Arc::new(ScriptedProvider::new("anthropic", vec![Ok("ok")]));
        let client = client(primary, Some(fallback.clone()));

        let resp = client.generate(&request()).await.unwrap();
        assert_eq!(resp.provider, "anthropic");
        assert_eq!(*fallback.calls.lock().unwrap(), vec!["fallback-model"]);
    }

    #[tokio::test]
    async fn test_generate_without_fallback_reports_primary_error() {
        let primary = Arc::new(ScriptedProvider::new("openai", vec![Err("401 unauthorized")]));
        let client = client(primary, None);

        let err = client.generate(&request()).await.unwrap_err();
        assert!(err.to_string().contains("primary provider openai failed"));
        assert!(err.to_string().contains("401 unauthorized"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_with_retry_recovers() {
        let primary = Arc::new(ScriptedProvider::new(
            "openai",
            vec![Err("connection reset"), Ok("second try")],
        ));
        let mut client = client(primary.clone(), None);
        client.max_retries = 3;

        let resp = client.generate(&request()).await.unwrap();
        assert_eq!(resp.content, "second try");
        assert_eq!(primary.calls.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_backoff_delay_bounds() {
        for attempt in 0..6 {
            let delay = backoff_delay(attempt);
            let base = Duration::from_secs(1 << attempt.min(4)).min(MAX_BACKOFF);
            assert!(delay >= base, "attempt {attempt}: {delay:?} < {base:?}");
            assert!(delay <= base + base / 4);
        }
    }

    #[test]
    fn test_classify_error_categories() {
        let cases = vec![
            ("rate limit exceeded", "rate_limit"),
            ("status 429: too many requests", "rate_limit"),
            ("request timed out", "timeout"),
            ("401 unauthorized", "auth_error"),
            ("invalid api key", "auth_error"),
            ("422 unprocessable entity", "invalid_request"),
            ("503 service unavailable", "server_error"),
            ("connection refused", "network_error"),
            ("something unexpected", "unknown_error"),
        ];

        for (msg, expected) in cases {
            let err = anyhow::anyhow!("{}", msg);
            assert_eq!(
                classify_error(&err),
                expected,
                "classify_error({msg:?}) should be {expected:?}"
            );
        }
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hello");
        let result = truncate("hé世界!", 3);
        assert!(result.len() <= 3);
        assert_eq!(result, "hé");
    }
}
