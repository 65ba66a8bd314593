use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::metrics;
use crate::watchdog::{AlertPayload, CheckinCoordinator, CheckinError};

/// Application state shared across handlers
pub struct AppState {
    pub coordinator: CheckinCoordinator,
}

// ============================================================================
// Check-in
// ============================================================================

pub async fn ping(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(payload): Json<AlertPayload>,
) -> Result<StatusCode, ApiError> {
    let timer = metrics::CHECKIN_DURATION.start_timer();
    let result = state.coordinator.checkin(&key, &payload);
    timer.observe_duration();

    match result {
        Ok(()) => Ok(StatusCode::OK),
        Err(e @ CheckinError::InvalidKey(_)) => Err(ApiError::BadRequest(e.to_string())),
    }
}

// ============================================================================
// Health Check
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// Key provisioning
// ============================================================================

#[derive(Serialize)]
pub struct IdResponse {
    pub timerid: String,
}

pub async fn gen_id() -> impl IntoResponse {
    let id = uuid::Uuid::new_v4().simple().to_string();
    (StatusCode::CREATED, Json(IdResponse { timerid: id }))
}

// ============================================================================
// Version & Metrics
// ============================================================================

pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub async fn metrics_exposition() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::render(),
    )
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}
