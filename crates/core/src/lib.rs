pub mod config;
pub mod dispatcher;
pub mod episode;
pub mod metadata;
pub mod metrics;
pub mod orchestrator;
pub mod publisher;
pub mod store;
pub mod testing;
pub mod uploader;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use episode::{next_episode, CategoryGroup, CategoryTree, EpisodeDescriptor};
pub use orchestrator::{
    BackupController, IngestController, OrchestratorError, PublishController, Scheduler,
    TriggerController,
};
pub use store::{SqliteStatusStore, StatusStore, StoreError};
