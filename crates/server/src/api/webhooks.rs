//! Inbound webhook handlers.
//!
//! Two notification kinds arrive here: stage progress from the
//! workflow runner and media-ready from the storage host. Both are
//! fire-and-forget on the sender's side, so responses carry the
//! resulting state for operators rather than for the sender.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

use showrunner_core::orchestrator::{
    OrchestratorError, ProgressNotification, ReadyNotification,
};
use showrunner_core::store::{Artifact, WorkflowRun};

use crate::state::AppState;

/// Error response
#[derive(Debug, Serialize)]
pub struct WebhookErrorResponse {
    pub error: String,
}

fn error_response(e: OrchestratorError) -> (StatusCode, Json<WebhookErrorResponse>) {
    let status = match &e {
        OrchestratorError::UnknownRun(_) => StatusCode::NOT_FOUND,
        OrchestratorError::InvalidNotification(_) => StatusCode::UNPROCESSABLE_ENTITY,
        OrchestratorError::Upload(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(WebhookErrorResponse {
            error: e.to_string(),
        }),
    )
}

/// Record a pipeline stage-completion notification
pub async fn pipeline_progress(
    State(state): State<Arc<AppState>>,
    Json(notification): Json<ProgressNotification>,
) -> Result<Json<WorkflowRun>, impl IntoResponse> {
    match state.ingest().apply_progress(&notification) {
        Ok(run) => Ok(Json(run)),
        Err(e) => Err(error_response(e)),
    }
}

/// Handle a media-ready notification: upload unlisted, register the artifact
pub async fn media_ready(
    State(state): State<Arc<AppState>>,
    Json(notification): Json<ReadyNotification>,
) -> Result<(StatusCode, Json<Artifact>), impl IntoResponse> {
    match state.ingest().handle_ready(&notification).await {
        Ok(artifact) => Ok((StatusCode::CREATED, Json(artifact))),
        Err(e) => Err(error_response(e)),
    }
}
