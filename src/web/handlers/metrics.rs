use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::web::AppState;

/// Prometheus metrics endpoint handler
///
/// Serializes the shared registry on demand. Always responds with whatever
/// the last successful poll cycle published; there is no "no data" state
/// once one cycle has succeeded.
pub async fn prometheus_metrics(State(state): State<AppState>) -> Result<Response, StatusCode> {
    match state.metrics.encode() {
        Ok(output) => Ok((
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            output,
        )
            .into_response()),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}
