use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// A persisted report. `content` holds the raw report JSON as generated; it
/// is enhanced again on every read.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReportRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub keyword: String,
    pub geographic_area: String,
    pub content: Option<serde_json::Value>,
    pub trace_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ReportSummary {
    pub id: Uuid,
    pub keyword: String,
    pub geographic_area: String,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct InsertReport<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub keyword: &'a str,
    pub geographic_area: &'a str,
    pub content: &'a serde_json::Value,
    pub trace_id: Option<&'a str>,
}

#[tracing::instrument(name = "db.reports.insert", skip_all, fields(report.id = %params.id))]
pub async fn insert_report(pool: &PgPool, params: &InsertReport<'_>) -> Result<Uuid, sqlx::Error> {
    let row: (Uuid,) = sqlx::query_as(
        "INSERT INTO reports (id, user_id, keyword, geographic_area, content, trace_id) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING id",
    )
    .bind(params.id)
    .bind(params.user_id)
    .bind(params.keyword)
    .bind(params.geographic_area)
    .bind(params.content)
    .bind(params.trace_id)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}

/// Fetches a report owned by `user_id`. Reports of other users read as absent.
#[tracing::instrument(name = "db.reports.get", skip(pool))]
pub async fn get_report(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<ReportRow>, sqlx::Error> {
    sqlx::query_as::<_, ReportRow>(
        "SELECT id, user_id, keyword, geographic_area, content, trace_id, created_at \
         FROM reports WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

#[tracing::instrument(name = "db.reports.list", skip(pool))]
pub async fn list_reports(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<ReportSummary>, sqlx::Error> {
    sqlx::query_as::<_, ReportSummary>(
        "SELECT id, keyword, geographic_area, content->>'title' AS title, created_at \
         FROM reports WHERE user_id = $1 \
         ORDER BY created_at DESC LIMIT $2 OFFSET $3",
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

/// Deletes a report owned by `user_id`. Returns whether a row was removed.
#[tracing::instrument(name = "db.reports.delete", skip(pool))]
pub async fn delete_report(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM reports WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
