pub mod health;
pub mod reports;

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::AppState;
use crate::telemetry::http::{HttpMakeSpan, HttpOnResponse};

/// Report generation waits on the LLM, so the timeout is generous.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health))
        .route(
            "/api/reports",
            post(reports::create_report).get(reports::list_reports),
        )
        .route("/api/reports/enhance", post(reports::enhance_report))
        .route(
            "/api/reports/{id}",
            get(reports::get_report).delete(reports::delete_report),
        )
        .route("/api/reports/{id}/export", post(reports::export_report))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(HttpMakeSpan)
                        .on_response(HttpOnResponse),
                )
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    REQUEST_TIMEOUT,
                )),
        )
        .with_state(state)
}
