//! Hub handlers: remote existence check and snapshot download.

use axum::extract::State;
use axum::Json;
use serde_json::json;

use vllmd_core::HubRequest;

use crate::dto::ApiResponse;
use crate::error::HttpError;
use crate::state::AppState;

/// `POST /api/vllm/hf/health` — does the model exist on the hub.
pub async fn hub_health(
    State(state): State<AppState>,
    Json(req): Json<HubRequest>,
) -> Result<Json<ApiResponse>, HttpError> {
    state.hub.model_exists(&req.model_id).await?;
    Ok(Json(ApiResponse::success(
        format!("Model {} is available on the hub.", req.model_id),
        json!({ "model_id": req.model_id, "exists": true }),
    )))
}

/// `POST /api/vllm/hf/download` — blocking snapshot download.
///
/// `allow_patterns` accepts a list or a comma-separated string; it is
/// normalized before the hub collaborator sees it.
pub async fn hub_download(
    State(state): State<AppState>,
    Json(req): Json<HubRequest>,
) -> Result<Json<ApiResponse>, HttpError> {
    let patterns = req
        .allow_patterns
        .as_ref()
        .map(vllmd_core::AllowPatterns::normalize)
        .unwrap_or_default();

    let report = state
        .hub
        .snapshot_download(&req.model_id, &req.download_dir, &patterns)
        .await?;

    Ok(Json(ApiResponse::success(
        format!(
            "All requested files for repo {} have been downloaded to {}.",
            report.model_id,
            report.snapshot_dir.display()
        ),
        json!({
            "model_id": report.model_id,
            "download_dir": report.snapshot_dir,
            "files_downloaded": report.files_downloaded,
        }),
    )))
}
