//! Read-only status API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use showrunner_core::store::{Artifact, ArtifactKind, WorkflowRun};

use crate::state::AppState;

/// Maximum allowed limit for listing queries
const MAX_LIMIT: u32 = 500;

/// Default limit for listing queries
const DEFAULT_LIMIT: u32 = 50;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing runs
#[derive(Debug, Deserialize)]
pub struct ListRunsParams {
    /// Maximum number of runs to return
    pub limit: Option<u32>,
}

/// Query parameters for listing artifacts
#[derive(Debug, Deserialize)]
pub struct ListArtifactsParams {
    /// Restrict to artifacts uploaded on this date (YYYY-MM-DD)
    pub date: Option<NaiveDate>,
    /// Filter by artifact kind ("primary" or "secondary")
    pub kind: Option<String>,
    /// Maximum number of artifacts to return
    pub limit: Option<u32>,
}

/// Response for listing runs
#[derive(Debug, Serialize)]
pub struct ListRunsResponse {
    pub runs: Vec<WorkflowRun>,
    pub total: usize,
}

/// Response for listing artifacts
#[derive(Debug, Serialize)]
pub struct ListArtifactsResponse {
    pub artifacts: Vec<Artifact>,
    pub total: usize,
}

/// Scheduler status and the configured daily slots
#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub enabled: bool,
    pub running: bool,
    pub main: String,
    pub backup_check: String,
    pub publish_primary: String,
    pub publish_secondary: String,
    /// The episode the next main trigger will dispatch
    pub next_episode: Option<showrunner_core::EpisodeDescriptor>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct StatusErrorResponse {
    pub error: String,
}

fn clamp_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT)
}

fn internal_error(e: impl std::fmt::Display) -> (StatusCode, Json<StatusErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(StatusErrorResponse {
            error: e.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// List recent workflow runs, newest first
pub async fn list_runs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListRunsParams>,
) -> Result<Json<ListRunsResponse>, impl IntoResponse> {
    match state.store().recent_runs(clamp_limit(params.limit)) {
        Ok(runs) => Ok(Json(ListRunsResponse {
            total: runs.len(),
            runs,
        })),
        Err(e) => Err(internal_error(e)),
    }
}

/// Get a single workflow run by id
pub async fn get_run(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<WorkflowRun>, impl IntoResponse> {
    match state.store().get_run(&id) {
        Ok(Some(run)) => Ok(Json(run)),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(StatusErrorResponse {
                error: format!("run not found: {}", id),
            }),
        )),
        Err(e) => Err(internal_error(e)),
    }
}

/// List artifacts, either for a specific upload date or newest first
pub async fn list_artifacts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListArtifactsParams>,
) -> Result<Json<ListArtifactsResponse>, impl IntoResponse> {
    let kind = match params.kind.as_deref() {
        Some(s) => match ArtifactKind::parse(s) {
            Some(kind) => Some(kind),
            None => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(StatusErrorResponse {
                        error: format!("unknown artifact kind: {}", s),
                    }),
                ))
            }
        },
        None => None,
    };

    let result = match params.date {
        Some(date) => state.store().artifacts_by_date(date, kind),
        None => state
            .store()
            .recent_artifacts(clamp_limit(params.limit))
            .map(|artifacts| match kind {
                Some(kind) => artifacts.into_iter().filter(|a| a.kind == kind).collect(),
                None => artifacts,
            }),
    };

    match result {
        Ok(artifacts) => Ok(Json(ListArtifactsResponse {
            total: artifacts.len(),
            artifacts,
        })),
        Err(e) => Err(internal_error(e)),
    }
}

/// Get a single artifact by id
pub async fn get_artifact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Artifact>, impl IntoResponse> {
    match state.store().get_artifact(&id) {
        Ok(Some(artifact)) => Ok(Json(artifact)),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(StatusErrorResponse {
                error: format!("artifact not found: {}", id),
            }),
        )),
        Err(e) => Err(internal_error(e)),
    }
}

/// Get scheduler status and configured slots
pub async fn get_schedule(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ScheduleResponse>, impl IntoResponse> {
    let schedule = &state.config().schedule;
    let next_episode = match state.trigger().next_descriptor() {
        Ok(descriptor) => Some(descriptor),
        Err(e) => return Err(internal_error(e)),
    };
    Ok(Json(ScheduleResponse {
        enabled: schedule.enabled,
        running: state.scheduler().is_running(),
        main: schedule.main.clone(),
        backup_check: schedule.backup_check.clone(),
        publish_primary: schedule.publish_primary.clone(),
        publish_secondary: schedule.publish_secondary.clone(),
        next_episode,
    }))
}
