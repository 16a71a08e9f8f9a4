use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::AppState;
use crate::db::reports::ReportSummary;
use crate::error::{AppError, AppResult};
use crate::export::{self, ExportDocument};
use crate::pipeline::{
    CreatedReport,
    GenerationSettings,
    ReportRequest,
    SavedReport,
    Subject,
    create_report as run_pipeline,
    load_saved_report,
};
use crate::report::{self, Report};

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct CreateReportBody {
    pub keyword: Option<String>,
    pub url: Option<String>,
    pub geographic_area: Option<String>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub user_id: Uuid,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportBody {
    #[serde(default)]
    pub charts: HashMap<String, String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Exactly one of `keyword` and `url` must be given; a url must parse.
fn subject_from(body_keyword: Option<String>, body_url: Option<String>) -> AppResult<Subject> {
    match (non_blank(body_keyword), non_blank(body_url)) {
        (Some(keyword), None) => Ok(Subject::Keyword(keyword)),
        (None, Some(url)) => {
            let parsed = reqwest::Url::parse(&url)
                .map_err(|_| AppError::Validation(format!("invalid url: {url}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(AppError::Validation("url must use http or https".into()));
            }
            Ok(Subject::Url(url))
        }
        (Some(_), Some(_)) => Err(AppError::Validation(
            "provide either keyword or url, not both".into(),
        )),
        (None, None) => Err(AppError::Validation("keyword or url is required".into())),
    }
}

pub async fn create_report(
    State(state): State<AppState>,
    Json(body): Json<CreateReportBody>,
) -> AppResult<Json<CreatedReport>> {
    let subject = subject_from(body.keyword, body.url)?;
    let geographic_area = non_blank(body.geographic_area)
        .unwrap_or_else(|| state.config.default_geographic_area.clone());

    let settings = GenerationSettings {
        model: state.config.llm_model.clone(),
        temperature: state.config.default_temperature,
        max_tokens: state.config.default_max_tokens,
    };

    let request = ReportRequest {
        subject,
        geographic_area,
        user_id: body.user_id,
    };

    let created = run_pipeline(
        &state.pool,
        state.llm_client.as_deref(),
        &settings,
        &state.sample,
        &request,
    )
    .await?;

    Ok(Json(created))
}

pub async fn list_reports(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> AppResult<Json<Vec<ReportSummary>>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);

    let reports =
        crate::db::reports::list_reports(&state.pool, params.user_id, limit, offset).await?;

    Ok(Json(reports))
}

pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(owner): Query<OwnerQuery>,
) -> AppResult<Json<SavedReport>> {
    Ok(Json(load_saved_report(&state.pool, id, owner.user_id).await?))
}

pub async fn delete_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(owner): Query<OwnerQuery>,
) -> AppResult<StatusCode> {
    let deleted = crate::db::reports::delete_report(&state.pool, id, owner.user_id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("Report {id} not found")));
    }
    tracing::info!(report.id = %id, "Report deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Normalizes an arbitrary raw report body without generating or saving.
pub async fn enhance_report(Json(raw): Json<serde_json::Value>) -> Json<Report> {
    Json(report::enhance(&raw))
}

pub async fn export_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(owner): Query<OwnerQuery>,
    Json(body): Json<ExportBody>,
) -> AppResult<Json<ExportDocument>> {
    let saved = load_saved_report(&state.pool, id, owner.user_id).await?;
    Ok(Json(export::build_document(
        &saved.report,
        &saved.keyword,
        &body.charts,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_defaults() {
        let query: ListQuery =
            serde_json::from_str(r#"{"user_id": "6f1c2d4e-8a9b-4c3d-9e2f-1a2b3c4d5e6f"}"#).unwrap();
        assert_eq!(query.limit, None);
        assert_eq!(query.offset, None);
    }

    #[test]
    fn test_list_query_requires_user() {
        assert!(serde_json::from_str::<ListQuery>(r#"{"limit": 10}"#).is_err());
    }

    #[test]
    fn test_owner_query_requires_user() {
        assert!(serde_json::from_str::<OwnerQuery>("{}").is_err());
        assert!(serde_json::from_str::<OwnerQuery>(r#"{"user_id": "not-a-uuid"}"#).is_err());

        let owner: OwnerQuery =
            serde_json::from_str(r#"{"user_id": "6f1c2d4e-8a9b-4c3d-9e2f-1a2b3c4d5e6f"}"#).unwrap();
        assert_eq!(owner.user_id.to_string(), "6f1c2d4e-8a9b-4c3d-9e2f-1a2b3c4d5e6f");
    }

    #[test]
    fn test_create_report_body_deserialize() {
        let body: CreateReportBody = serde_json::from_str(
            r#"{"keyword": "Electric Bikes", "geographic_area": "Europe"}"#,
        )
        .unwrap();
        assert_eq!(body.keyword.as_deref(), Some("Electric Bikes"));
        assert_eq!(body.url, None);
        assert_eq!(body.geographic_area.as_deref(), Some("Europe"));
        assert_eq!(body.user_id, None);
    }

    #[test]
    fn test_subject_from_keyword() {
        let subject = subject_from(Some("  Electric Bikes ".into()), None).unwrap();
        assert_eq!(subject, Subject::Keyword("Electric Bikes".into()));
    }

    #[test]
    fn test_subject_from_url() {
        let subject = subject_from(None, Some("https://example.com/shop".into())).unwrap();
        assert_eq!(subject, Subject::Url("https://example.com/shop".into()));
    }

    #[test]
    fn test_subject_validation() {
        assert!(matches!(subject_from(None, None), Err(AppError::Validation(_))));
        assert!(matches!(
            subject_from(Some("".into()), Some("   ".into())),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            subject_from(Some("bikes".into()), Some("https://example.com".into())),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            subject_from(None, Some("not a url".into())),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            subject_from(None, Some("ftp://example.com".into())),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_export_body_defaults_to_no_charts() {
        let body: ExportBody = serde_json::from_str("{}").unwrap();
        assert!(body.charts.is_empty());

        let body: ExportBody =
            serde_json::from_str(r#"{"charts": {"forecast-chart": "data:image/png;base64,AA=="}}"#)
                .unwrap();
        assert_eq!(body.charts.len(), 1);
    }
}
