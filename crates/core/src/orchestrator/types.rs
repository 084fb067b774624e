//! Orchestrator outcome and error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dispatcher::DispatchError;
use crate::episode::EpisodeDescriptor;
use crate::publisher::PublisherError;
use crate::store::StoreError;
use crate::uploader::UploaderError;

/// Error type for orchestrator operations.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Publish(#[from] PublisherError),

    #[error(transparent)]
    Upload(#[from] UploaderError),

    #[error("unknown run: {0}")]
    UnknownRun(String),

    #[error("invalid notification: {0}")]
    InvalidNotification(String),
}

/// Result of a main trigger run.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TriggerOutcome {
    pub run_id: String,
    pub descriptor: EpisodeDescriptor,
}

/// Why a backup check decided not to dispatch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BackupSkipReason {
    /// Yesterday's run finished; its output is already uploaded.
    AlreadyUploaded,
    /// Yesterday's run is still inside the grace period.
    StillProcessing,
    /// The backup attempt cap for that day is spent.
    AttemptsExhausted,
}

impl BackupSkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackupSkipReason::AlreadyUploaded => "already_uploaded",
            BackupSkipReason::StillProcessing => "still_processing",
            BackupSkipReason::AttemptsExhausted => "attempts_exhausted",
        }
    }
}

/// Result of a backup check run.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum BackupOutcome {
    /// No dispatch was made.
    NotNeeded { reason: BackupSkipReason },
    /// A backup run was dispatched.
    Triggered {
        run_id: String,
        descriptor: EpisodeDescriptor,
        attempt: u32,
    },
}

/// Per-artifact result within a publish run.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PublishItemResult {
    pub artifact_id: String,
    pub title: String,
    pub published: bool,
    /// Whether a companion link was appended before publishing.
    pub cross_linked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate result of one publish controller run.
///
/// Per-item failures are isolated; `published < total` means some
/// items failed and carry their error in `items`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PublishReport {
    pub published: u32,
    pub total: u32,
    pub items: Vec<PublishItemResult>,
}

impl PublishReport {
    /// An empty report for a day with nothing to publish.
    pub fn empty() -> Self {
        Self {
            published: 0,
            total: 0,
            items: Vec::new(),
        }
    }
}
