//! Health check handlers

use axum::{extract::State, http::StatusCode, Json};
use redscope_common::VERSION;
use serde::Serialize;
use std::time::Instant;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub dataset: CheckResult,
    pub agent: CheckResult,
}

#[derive(Serialize)]
pub struct CheckResult {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Liveness probe - always returns healthy if server is running
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: VERSION,
    })
}

/// Readiness probe - the dataset must load; the agent is reported only
///
/// Pages other than QA work without an agent, so a missing key does not
/// make the service unready.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let start = Instant::now();

    let dataset = match state.datasets.get().await {
        Ok(dataset) => CheckResult {
            status: "up".to_string(),
            latency_ms: Some(start.elapsed().as_millis() as u64),
            detail: Some(format!("{} rows", dataset.len())),
            error: None,
        },
        Err(e) => CheckResult {
            status: "down".to_string(),
            latency_ms: None,
            detail: None,
            error: Some(e.to_string()),
        },
    };

    let agent = match state.qa.model_name() {
        Some(model) => CheckResult {
            status: "up".to_string(),
            latency_ms: None,
            detail: Some(model.to_string()),
            error: None,
        },
        None => CheckResult {
            status: "disabled".to_string(),
            latency_ms: None,
            detail: None,
            error: state.qa.unavailable_reason().map(str::to_string),
        },
    };

    let ready = dataset.status == "up";
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadyResponse {
            status: if ready { "ready" } else { "not_ready" }.to_string(),
            checks: HealthChecks { dataset, agent },
        }),
    )
}
