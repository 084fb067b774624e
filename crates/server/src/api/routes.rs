use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{handlers, status, triggers, webhooks};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Status
        .route("/runs", get(status::list_runs))
        .route("/runs/{id}", get(status::get_run))
        .route("/artifacts", get(status::list_artifacts))
        .route("/artifacts/{id}", get(status::get_artifact))
        .route("/schedule", get(status::get_schedule))
        // Inbound webhooks
        .route("/webhooks/pipeline", post(webhooks::pipeline_progress))
        .route("/webhooks/media-ready", post(webhooks::media_ready))
        // Manual triggers
        .route("/triggers/main", post(triggers::run_main))
        .route("/triggers/backup", post(triggers::run_backup))
        .route("/triggers/publish-primary", post(triggers::run_publish_primary))
        .route("/triggers/publish-secondary", post(triggers::run_publish_secondary));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::get_metrics))
        .with_state(state)
        .layer(middleware::from_fn(super::middleware::metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
