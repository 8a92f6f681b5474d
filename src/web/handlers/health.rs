//! Health check HTTP handlers

use axum::{Json, response::IntoResponse};
use serde_json::json;

/// Health check endpoint
///
/// The exporter has no dependencies to probe beyond its own process; the
/// modem being unreachable is reported through the scrape counters instead
/// of flapping this endpoint.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
