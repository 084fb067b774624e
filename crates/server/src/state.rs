use std::sync::Arc;
use showrunner_core::orchestrator::{
    BackupController, IngestController, PublishController, Scheduler, TriggerController,
};
use showrunner_core::{Config, SanitizedConfig, StatusStore};

/// Shared application state
pub struct AppState {
    config: Config,
    store: Arc<dyn StatusStore>,
    trigger: Arc<TriggerController>,
    backup: Arc<BackupController>,
    publish_primary: Arc<PublishController>,
    publish_secondary: Arc<PublishController>,
    ingest: Arc<IngestController>,
    scheduler: Arc<Scheduler>,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Config,
        store: Arc<dyn StatusStore>,
        trigger: Arc<TriggerController>,
        backup: Arc<BackupController>,
        publish_primary: Arc<PublishController>,
        publish_secondary: Arc<PublishController>,
        ingest: Arc<IngestController>,
        scheduler: Arc<Scheduler>,
    ) -> Self {
        Self {
            config,
            store,
            trigger,
            backup,
            publish_primary,
            publish_secondary,
            ingest,
            scheduler,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn store(&self) -> &dyn StatusStore {
        self.store.as_ref()
    }

    pub fn trigger(&self) -> &TriggerController {
        self.trigger.as_ref()
    }

    pub fn backup(&self) -> &BackupController {
        self.backup.as_ref()
    }

    pub fn publish_primary(&self) -> &PublishController {
        self.publish_primary.as_ref()
    }

    pub fn publish_secondary(&self) -> &PublishController {
        self.publish_secondary.as_ref()
    }

    pub fn ingest(&self) -> &IngestController {
        self.ingest.as_ref()
    }

    pub fn scheduler(&self) -> &Scheduler {
        self.scheduler.as_ref()
    }
}
