use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

use super::{ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub database: &'static str,
}

/// GET /api/health
/// Liveness plus a database round trip. A broken database degrades the
/// report but never fails the request.
pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthStatus>> {
    let database = if state.store().ping().await.is_ok() {
        "ok"
    } else {
        "unreachable"
    };

    Json(ApiResponse::success(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        database,
    }))
}
