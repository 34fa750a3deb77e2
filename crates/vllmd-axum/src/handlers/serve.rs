//! Serving process handlers: launch, shutdown, health.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::State;
use axum::Json;
use serde_json::json;

use vllmd_core::{ServeConfig, TerminationOutcome};

use crate::dto::ApiResponse;
use crate::error::HttpError;
use crate::state::AppState;

/// `POST /api/vllm/serve` — launch the serving process.
pub async fn serve(
    State(state): State<AppState>,
    Json(config): Json<ServeConfig>,
) -> Result<Json<ApiResponse>, HttpError> {
    let pid = state.supervisor.launch(&config).await?;
    Ok(Json(ApiResponse::success(
        format!(
            "Model '{}' serve initiated successfully with PID: {pid}.",
            config.model_id
        ),
        json!({ "pid": pid }),
    )))
}

/// `POST /api/vllm/down` — terminate the serving process tree.
pub async fn down(State(state): State<AppState>) -> Result<Json<ApiResponse>, HttpError> {
    let outcome = state.supervisor.terminate().await?;
    let message = match outcome {
        TerminationOutcome::Graceful => "Serving process shut down gracefully.",
        TerminationOutcome::Forced => "Serving process required a forceful kill to shut down.",
    };
    Ok(Json(ApiResponse::success(
        message,
        json!({ "outcome": outcome }),
    )))
}

/// `GET /api/vllm/health` — controller health plus process tri-state.
///
/// Always 200: this reports on the controller, not the child. Querying
/// liveness here is what collapses the slot after an independent child exit.
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse> {
    let process = state.supervisor.status().await;
    let started_at = state
        .supervisor
        .started_at()
        .await
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs());
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    Json(ApiResponse::success(
        "vllmd controller is healthy and operational",
        json!({
            "controller_status": "healthy",
            "timestamp": timestamp,
            "platform": std::env::consts::OS,
            "process": process,
            "started_at": started_at,
        }),
    ))
}
