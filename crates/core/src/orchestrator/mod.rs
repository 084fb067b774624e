//! Daily production orchestration.
//!
//! Four scheduled controllers drive the pipeline: the trigger
//! controller dispatches the next episode, the backup controller
//! re-dispatches stalled days, and two publish controllers flip the
//! day's artifacts public. The ingest controller sits on the webhook
//! path and turns runner notifications into state updates and uploads.

mod backup;
mod config;
mod ingest;
mod publish;
mod scheduler;
mod trigger;
mod types;

pub use backup::BackupController;
pub use config::{OrchestratorConfig, ScheduleConfig, ScheduleError};
pub use ingest::{
    FileReference, IngestController, MediaReferences, PipelineStage, ProgressNotification,
    ReadyNotification,
};
pub use publish::PublishController;
pub use scheduler::Scheduler;
pub use trigger::TriggerController;
pub use types::{
    BackupOutcome, BackupSkipReason, OrchestratorError, PublishItemResult, PublishReport,
    TriggerOutcome,
};
