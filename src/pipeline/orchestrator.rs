use opentelemetry::KeyValue;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::reports::InsertReport;
use crate::error::{AppError, AppResult, current_trace_id};
use crate::llm::LlmClient;
use crate::report::{self, Report, SampleReport};
use crate::telemetry::metrics::{REPORT_GENERATION_DURATION, REPORTS_SAVED};

use super::generate::{self, ContentSource, GenerationSettings, Subject};

#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub subject: Subject,
    pub geographic_area: String,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub keyword: String,
    pub geographic_area: String,
    pub report: Report,
}

#[derive(Debug, Clone, Serialize)]
pub struct SavedReport {
    pub id: Uuid,
    pub keyword: String,
    pub geographic_area: String,
    pub report: Report,
}

/// Generates, enhances and (for signed-in users) saves a report. The raw
/// generated content is what gets persisted.
#[tracing::instrument(
    name = "pipeline report",
    skip_all,
    fields(
        report.id,
        report.subject = %request.subject.label(),
        report.area = %request.geographic_area,
        report.duration_ms,
    )
)]
pub async fn create_report(
    pool: &PgPool,
    llm_client: Option<&LlmClient>,
    settings: &GenerationSettings,
    sample: &SampleReport,
    request: &ReportRequest,
) -> AppResult<CreatedReport> {
    let start = std::time::Instant::now();
    let span = tracing::Span::current();

    let generated = generate::generate_content(
        llm_client,
        settings,
        sample,
        &request.subject,
        &request.geographic_area,
    )
    .await;

    let report = report::enhance(&generated.content);
    let keyword = request.subject.label().to_string();

    let id = match request.user_id {
        Some(user_id) => {
            let trace_id = current_trace_id();
            let id = crate::db::reports::insert_report(
                pool,
                &InsertReport {
                    id: Uuid::new_v4(),
                    user_id,
                    keyword: &keyword,
                    geographic_area: &request.geographic_area,
                    content: &generated.content,
                    trace_id: trace_id.as_deref(),
                },
            )
            .await?;
            REPORTS_SAVED.add(1, &[]);
            span.record("report.id", id.to_string());
            Some(id)
        }
        None => None,
    };

    let duration = start.elapsed();
    REPORT_GENERATION_DURATION.record(
        duration.as_secs_f64(),
        &[KeyValue::new("report.source", source_label(generated.source))],
    );
    span.record("report.duration_ms", duration.as_millis() as i64);

    Ok(CreatedReport {
        id,
        keyword,
        geographic_area: request.geographic_area.clone(),
        report,
    })
}

/// Loads a report saved by `user_id` and runs it through enhancement again.
/// Another user's report is reported as not found.
#[tracing::instrument(name = "pipeline load_saved_report", skip(pool))]
pub async fn load_saved_report(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> AppResult<SavedReport> {
    let row = crate::db::reports::get_report(pool, id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Report {id} not found")))?;

    let content = saved_content(id, row.content)?;

    Ok(SavedReport {
        id: row.id,
        keyword: row.keyword,
        geographic_area: row.geographic_area,
        report: report::enhance(&content),
    })
}

fn saved_content(id: Uuid, content: Option<serde_json::Value>) -> AppResult<serde_json::Value> {
    match content {
        Some(value) if !value.is_null() => Ok(value),
        _ => Err(AppError::NoContent(format!("Report {id} has no content"))),
    }
}

fn source_label(source: ContentSource) -> &'static str {
    match source {
        ContentSource::Llm => "llm",
        ContentSource::Sample => "sample",
    }
}
