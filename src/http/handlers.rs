use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::http::server::AppState;
use crate::publish::Snapshot;

#[derive(Serialize)]
pub struct HealthStatus {
    pub version: &'static str,
    pub status: &'static str,
}

pub async fn get_healthz() -> Json<HealthStatus> {
    Json(HealthStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}

/// Latest whole-tick snapshot as JSON.
pub async fn get_status(State(state): State<AppState>) -> Json<Snapshot> {
    Json(Snapshot::clone(&state.snapshots.load()))
}

/// Prometheus text exposition.
pub async fn get_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(exporter) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            exporter.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics disabled").into_response(),
    }
}
