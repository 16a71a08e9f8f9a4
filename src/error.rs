use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use opentelemetry::trace::TraceContextExt;
use serde_json::json;
use thiserror::Error;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The saved report exists but holds no content.
    #[error("No content: {0}")]
    NoContent(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    /// Stable machine-readable code; `NotFound` and `NoContent` share a
    /// status but not a code.
    fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::NotFound(_) => "not_found",
            AppError::NoContent(_) => "no_content",
            AppError::Database(_) => "internal",
        }
    }

    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) | AppError::NoContent(msg) => {
                (StatusCode::NOT_FOUND, msg.clone())
            }
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

/// Trace id of the current span, if it belongs to a sampled OTel trace.
pub fn current_trace_id() -> Option<String> {
    let context = Span::current().context();
    let span_ref = context.span();
    let span_context = span_ref.span_context();

    span_context
        .is_valid()
        .then(|| span_context.trace_id().to_string())
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Database(e) => tracing::error!(error = %e, "Database error"),
            AppError::NoContent(msg) => tracing::warn!(error = %msg, "Saved report has no content"),
            AppError::Validation(_) | AppError::NotFound(_) => {}
        }

        let (status, error_message) = self.status_and_message();

        let mut body = json!({
            "error": error_message,
            "code": self.code(),
            "status": status.as_u16(),
        });
        if let Some(trace_id) = current_trace_id() {
            body["trace_id"] = trace_id.into();
        }

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let error = AppError::Validation("keyword is required".to_string());
        assert_eq!(error.to_string(), "Validation error: keyword is required");
        assert_eq!(error.status_and_message().0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_and_no_content_are_distinct() {
        let missing = AppError::NotFound("Report 42 not found".to_string());
        let empty = AppError::NoContent("Report 42 has no content".to_string());
        assert_eq!(missing.to_string(), "Not found: Report 42 not found");
        assert_eq!(empty.to_string(), "No content: Report 42 has no content");

        let (missing_status, missing_msg) = missing.status_and_message();
        let (empty_status, empty_msg) = empty.status_and_message();
        assert_eq!(missing_status, StatusCode::NOT_FOUND);
        assert_eq!(empty_status, StatusCode::NOT_FOUND);
        assert_ne!(missing_msg, empty_msg);
        assert_ne!(missing.code(), empty.code());
    }

    #[test]
    fn test_database_errors_hide_details() {
        let error = AppError::Database(sqlx::Error::RowNotFound);
        let (status, message) = error.status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Internal server error");
        assert_eq!(error.code(), "internal");
    }

    #[test]
    fn test_into_response_status() {
        let response = AppError::NoContent("empty".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_no_trace_id_outside_a_trace() {
        assert_eq!(current_trace_id(), None);
    }
}
