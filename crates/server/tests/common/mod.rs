//! Common test utilities for API testing with mocks.
//!
//! Provides a test fixture that builds an in-process router with mock
//! adapters injected, so webhook and trigger flows can be exercised
//! without external infrastructure.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use showrunner_core::config::{Config, ContentConfig, DatabaseConfig, ServerConfig};
use showrunner_core::dispatcher::{JobDispatcher, WorkflowDispatcherConfig};
use showrunner_core::metadata::MetadataFetcher;
use showrunner_core::orchestrator::{
    BackupController, IngestController, OrchestratorConfig, PublishController, ScheduleConfig,
    Scheduler, TriggerController,
};
use showrunner_core::publisher::{MediaHostConfig, Publisher};
use showrunner_core::store::ArtifactKind;
use showrunner_core::testing::{
    test_tree, MockDispatcher, MockMetadataFetcher, MockPublisher, MockUploader,
};
use showrunner_core::uploader::Uploader;
use showrunner_core::{CategoryGroup, SqliteStatusStore, StatusStore};

use showrunner_server::api::create_router;
use showrunner_server::state::AppState;

/// Test fixture for API testing with mock adapters.
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// The status store backing the fixture
    pub store: Arc<SqliteStatusStore>,
    /// Mock workflow dispatcher - inspect and fail dispatches
    pub dispatcher: Arc<MockDispatcher>,
    /// Mock publisher - inspect visibility and description calls
    pub publisher: Arc<MockPublisher>,
    /// Mock uploader - inspect uploads
    pub uploader: Arc<MockUploader>,
    /// Mock metadata fetcher - register metadata documents
    pub metadata: Arc<MockMetadataFetcher>,
    /// Temporary directory for the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let store =
            Arc::new(SqliteStatusStore::new(&db_path).expect("Failed to create status store"));
        let dispatcher = Arc::new(MockDispatcher::new());
        let publisher = Arc::new(MockPublisher::new());
        let uploader = Arc::new(MockUploader::new());
        let metadata = Arc::new(MockMetadataFetcher::new());

        let tree = test_tree();
        let schedule = ScheduleConfig {
            enabled: false,
            ..Default::default()
        };
        let orchestrator_config = OrchestratorConfig::default();

        let config = Config {
            server: ServerConfig::default(),
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            content: ContentConfig {
                categories: vec![CategoryGroup {
                    name: "history".to_string(),
                    sub_categories: vec!["ancient-rome".to_string(), "medieval".to_string()],
                }],
            },
            dispatcher: WorkflowDispatcherConfig {
                url: "http://localhost:9/dispatch".to_string(),
                token: "test-token".to_string(),
                git_ref: "main".to_string(),
                timeout_secs: 5,
            },
            publisher: MediaHostConfig {
                api_base: "http://localhost:9/api".to_string(),
                api_token: "test-token".to_string(),
                timeout_secs: 5,
            },
            schedule: schedule.clone(),
            orchestrator: orchestrator_config.clone(),
        };

        let trigger = Arc::new(TriggerController::new(
            Arc::clone(&store) as Arc<dyn StatusStore>,
            Arc::clone(&dispatcher) as Arc<dyn JobDispatcher>,
            tree.clone(),
        ));
        let backup = Arc::new(BackupController::new(
            Arc::clone(&store) as Arc<dyn StatusStore>,
            Arc::clone(&dispatcher) as Arc<dyn JobDispatcher>,
            tree,
            orchestrator_config.clone(),
        ));
        let publish_primary = Arc::new(PublishController::new(
            Arc::clone(&store) as Arc<dyn StatusStore>,
            Arc::clone(&publisher) as Arc<dyn Publisher>,
            ArtifactKind::Primary,
            orchestrator_config.cross_link_template.clone(),
        ));
        let publish_secondary = Arc::new(PublishController::new(
            Arc::clone(&store) as Arc<dyn StatusStore>,
            Arc::clone(&publisher) as Arc<dyn Publisher>,
            ArtifactKind::Secondary,
            orchestrator_config.cross_link_template.clone(),
        ));
        let ingest = Arc::new(IngestController::new(
            Arc::clone(&store) as Arc<dyn StatusStore>,
            Arc::clone(&uploader) as Arc<dyn Uploader>,
            Arc::clone(&metadata) as Arc<dyn MetadataFetcher>,
            schedule.clone(),
        ));
        let scheduler = Arc::new(Scheduler::new(
            Arc::clone(&trigger),
            Arc::clone(&backup),
            Arc::clone(&publish_primary),
            Arc::clone(&publish_secondary),
            schedule,
        ));

        let state = Arc::new(AppState::new(
            config,
            Arc::clone(&store) as Arc<dyn StatusStore>,
            trigger,
            backup,
            publish_primary,
            publish_secondary,
            ingest,
            scheduler,
        ));

        let router = create_router(state);

        Self {
            router,
            store,
            dispatcher,
            publisher,
            uploader,
            metadata,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request with an empty body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
