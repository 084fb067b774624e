use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use showrunner_core::{
    load_config, validate_config, BackupController, Config, IngestController, PublishController,
    Scheduler, SqliteStatusStore, StatusStore, TriggerController,
};
use showrunner_core::dispatcher::{JobDispatcher, WorkflowDispatcher};
use showrunner_core::metadata::{HttpMetadataFetcher, MetadataFetcher};
use showrunner_core::publisher::{MediaHostPublisher, Publisher};
use showrunner_core::store::ArtifactKind;
use showrunner_core::uploader::{MediaHostUploader, Uploader};

use showrunner_server::api::create_router;
use showrunner_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("SHOWRUNNER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Config hash: {}", config_fingerprint(&config));
    info!("Database path: {:?}", config.database.path);

    let tree = config
        .category_tree()
        .context("Failed to build category tree")?;

    // Create SQLite status store
    let store: Arc<dyn StatusStore> = Arc::new(
        SqliteStatusStore::new(&config.database.path)
            .context("Failed to create status store")?,
    );
    info!("Status store initialized");

    // Create workflow dispatcher
    let dispatcher: Arc<dyn JobDispatcher> = Arc::new(
        WorkflowDispatcher::new(config.dispatcher.clone())
            .context("Failed to create workflow dispatcher")?,
    );
    info!("Workflow dispatcher initialized ({})", config.dispatcher.url);

    // Create media host clients
    let publisher: Arc<dyn Publisher> = Arc::new(
        MediaHostPublisher::new(config.publisher.clone())
            .context("Failed to create media host publisher")?,
    );
    let uploader: Arc<dyn Uploader> = Arc::new(
        MediaHostUploader::new(config.publisher.clone())
            .context("Failed to create media host uploader")?,
    );
    let metadata: Arc<dyn MetadataFetcher> = Arc::new(
        HttpMetadataFetcher::new(config.publisher.timeout_secs)
            .context("Failed to create metadata fetcher")?,
    );
    info!("Media host clients initialized ({})", config.publisher.api_base);

    // Create controllers
    let trigger = Arc::new(TriggerController::new(
        Arc::clone(&store),
        Arc::clone(&dispatcher),
        tree.clone(),
    ));
    let backup = Arc::new(BackupController::new(
        Arc::clone(&store),
        Arc::clone(&dispatcher),
        tree,
        config.orchestrator.clone(),
    ));
    let publish_primary = Arc::new(PublishController::new(
        Arc::clone(&store),
        Arc::clone(&publisher),
        ArtifactKind::Primary,
        config.orchestrator.cross_link_template.clone(),
    ));
    let publish_secondary = Arc::new(PublishController::new(
        Arc::clone(&store),
        Arc::clone(&publisher),
        ArtifactKind::Secondary,
        config.orchestrator.cross_link_template.clone(),
    ));
    let ingest = Arc::new(IngestController::new(
        Arc::clone(&store),
        uploader,
        metadata,
        config.schedule.clone(),
    ));

    // Create and start the daily scheduler
    let scheduler = Arc::new(Scheduler::new(
        Arc::clone(&trigger),
        Arc::clone(&backup),
        Arc::clone(&publish_primary),
        Arc::clone(&publish_secondary),
        config.schedule.clone(),
    ));
    scheduler.start().context("Failed to start scheduler")?;

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        store,
        trigger,
        backup,
        publish_primary,
        publish_secondary,
        ingest,
        Arc::clone(&scheduler),
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Stop the scheduler loops
    info!("Server shutting down...");
    scheduler.stop();
    info!("Scheduler stopped");

    Ok(())
}

/// Short SHA-256 fingerprint of the effective configuration, logged
/// at startup so config changes are visible across restarts.
fn config_fingerprint(config: &Config) -> String {
    let config_json = serde_json::to_string(config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    config_hash[..16].to_string()
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use showrunner_core::load_config_from_str;

    const BASE: &str = r#"
[content]
categories = [{ name = "history", sub_categories = ["ancient-rome"] }]

[dispatcher]
url = "https://ci.example.com/dispatch"
token = "dispatch-token"

[publisher]
api_base = "https://media.example.com/api"
api_token = "media-token"
"#;

    #[test]
    fn test_config_fingerprint_is_deterministic() {
        let config = load_config_from_str(BASE).unwrap();
        let a = config_fingerprint(&config);
        let b = config_fingerprint(&config);
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_config_fingerprint_tracks_changes() {
        let base = load_config_from_str(BASE).unwrap();
        let changed = load_config_from_str(&format!("{BASE}\n[server]\nport = 9000\n")).unwrap();
        assert_ne!(config_fingerprint(&base), config_fingerprint(&changed));
    }
}
