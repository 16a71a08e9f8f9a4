use std::sync::LazyLock;

use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter},
};

pub static METER: LazyLock<Meter> = LazyLock::new(|| global::meter("market-report-service"));

fn u64_counter(name: &'static str, description: &'static str, unit: &'static str) -> Counter<u64> {
    METER
        .u64_counter(name)
        .with_description(description)
        .with_unit(unit)
        .build()
}

fn f64_histogram(name: &'static str, description: &'static str, unit: &'static str) -> Histogram<f64> {
    METER
        .f64_histogram(name)
        .with_description(description)
        .with_unit(unit)
        .build()
}

// --- GenAI client ---

pub static GEN_AI_TOKEN_USAGE: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    f64_histogram("gen_ai.client.token.usage", "Tokens used per LLM call", "{token}")
});

pub static GEN_AI_OPERATION_DURATION: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    f64_histogram("gen_ai.client.operation.duration", "Duration of LLM calls", "s")
});

pub static GEN_AI_COST: LazyLock<Counter<f64>> = LazyLock::new(|| {
    METER
        .f64_counter("gen_ai.client.cost")
        .with_description("Estimated LLM cost in USD")
        .with_unit("usd")
        .build()
});

pub static GEN_AI_RETRY_COUNT: LazyLock<Counter<u64>> = LazyLock::new(|| {
    u64_counter("gen_ai.client.retry.count", "LLM call retries", "{retry}")
});

pub static GEN_AI_FALLBACK_COUNT: LazyLock<Counter<u64>> = LazyLock::new(|| {
    u64_counter("gen_ai.client.fallback.count", "Switches to the fallback provider", "{fallback}")
});

pub static GEN_AI_ERROR_COUNT: LazyLock<Counter<u64>> = LazyLock::new(|| {
    u64_counter("gen_ai.client.error.count", "Failed LLM calls", "{error}")
});

// --- Reports ---

pub static REPORT_GENERATION_DURATION: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    f64_histogram("report.generation.duration", "Time to generate and enhance a report", "s")
});

pub static REPORT_SAMPLE_FALLBACK: LazyLock<Counter<u64>> = LazyLock::new(|| {
    u64_counter("report.sample_fallback", "Reports served from the sample report", "{report}")
});

pub static REPORT_SECTIONS_DISCARDED: LazyLock<Counter<u64>> = LazyLock::new(|| {
    u64_counter(
        "report.sections_discarded",
        "Stored or generated report sections replaced because their shape did not match",
        "{section}",
    )
});

pub static REPORTS_SAVED: LazyLock<Counter<u64>> = LazyLock::new(|| {
    u64_counter("report.saved", "Reports persisted for a user", "{report}")
});

pub static EXPORT_CHARTS_SKIPPED: LazyLock<Counter<u64>> = LazyLock::new(|| {
    u64_counter("report.export.charts_skipped", "Chart captures left out of an export", "{chart}")
});

// --- HTTP ---

pub static HTTP_REQUESTS_TOTAL: LazyLock<Counter<u64>> = LazyLock::new(|| {
    u64_counter("http.requests.total", "HTTP requests served", "{request}")
});

pub static HTTP_REQUEST_DURATION: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    METER
        .f64_histogram("http.request.duration")
        .with_description("HTTP request duration")
        .with_unit("ms")
        .with_boundaries(vec![
            5.0, 25.0, 100.0, 250.0, 1000.0, 2500.0, 10000.0, 30000.0, 60000.0, 120000.0,
        ])
        .build()
});
