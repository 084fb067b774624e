//! Manual trigger handlers.
//!
//! Each endpoint runs the same controller pass the scheduler would
//! fire at its daily slot, for catch-up after downtime and for
//! operating the system by hand.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

use showrunner_core::orchestrator::{
    BackupOutcome, OrchestratorError, PublishReport, TriggerOutcome,
};

use crate::state::AppState;

/// Error response
#[derive(Debug, Serialize)]
pub struct TriggerErrorResponse {
    pub error: String,
}

fn error_response(e: OrchestratorError) -> (StatusCode, Json<TriggerErrorResponse>) {
    let status = match &e {
        OrchestratorError::Dispatch(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(TriggerErrorResponse {
            error: e.to_string(),
        }),
    )
}

/// Run the main daily trigger now
pub async fn run_main(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TriggerOutcome>, impl IntoResponse> {
    match state.trigger().run().await {
        Ok(outcome) => Ok(Json(outcome)),
        Err(e) => Err(error_response(e)),
    }
}

/// Run the backup check now
pub async fn run_backup(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BackupOutcome>, impl IntoResponse> {
    match state.backup().run().await {
        Ok(outcome) => Ok(Json(outcome)),
        Err(e) => Err(error_response(e)),
    }
}

/// Run the primary publish pass now
pub async fn run_publish_primary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PublishReport>, impl IntoResponse> {
    match state.publish_primary().run().await {
        Ok(report) => Ok(Json(report)),
        Err(e) => Err(error_response(e)),
    }
}

/// Run the secondary publish pass now
pub async fn run_publish_secondary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PublishReport>, impl IntoResponse> {
    match state.publish_secondary().run().await {
        Ok(report) => Ok(Json(report)),
        Err(e) => Err(error_response(e)),
    }
}
