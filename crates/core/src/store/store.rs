//! Status storage trait.

use chrono::NaiveDate;
use thiserror::Error;

use crate::episode::EpisodeDescriptor;
use crate::store::{Artifact, ArtifactKind, ArtifactPatch, RunPatch, WorkflowRun};

/// Error type for status store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No row with the given id.
    #[error("not found: {0}")]
    NotFound(String),
    /// A patch referenced a new row but omitted a required field.
    #[error("incomplete record for {id}: missing {field}")]
    Incomplete { id: String, field: &'static str },
    /// Database error.
    #[error("database error: {0}")]
    Database(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

/// Trait for orchestration status backends.
///
/// Writes are merge-patches: unset patch fields leave the stored value
/// untouched, so concurrent writers touching different fields of the
/// same row never clobber each other.
pub trait StatusStore: Send + Sync {
    /// The most recently produced episode, if any production has ever
    /// completed. Drives sequencing of the next dispatch.
    fn latest_episode(&self) -> Result<Option<EpisodeDescriptor>, StoreError>;

    /// Append an episode to the production history. Called only once a
    /// finished artifact is registered, never at dispatch time.
    fn record_episode(&self, descriptor: &EpisodeDescriptor) -> Result<(), StoreError>;

    /// Merge a patch into the run with the patch's `run_id`, creating
    /// the row if absent. Returns the merged row.
    fn upsert_run(&self, patch: RunPatch) -> Result<WorkflowRun, StoreError>;

    /// Get a run by id.
    fn get_run(&self, run_id: &str) -> Result<Option<WorkflowRun>, StoreError>;

    /// The latest run triggered on the given UTC date.
    fn run_for_date(&self, date: NaiveDate) -> Result<Option<WorkflowRun>, StoreError>;

    /// Number of backup runs recovering the given original trigger date.
    fn count_backup_runs(&self, original_date: NaiveDate) -> Result<u32, StoreError>;

    /// Most recent runs, newest first.
    fn recent_runs(&self, limit: u32) -> Result<Vec<WorkflowRun>, StoreError>;

    /// Merge a patch into the artifact with the patch's `artifact_id`,
    /// creating the row if absent. Returns the merged row.
    fn upsert_artifact(&self, patch: ArtifactPatch) -> Result<Artifact, StoreError>;

    /// Get an artifact by id.
    fn get_artifact(&self, artifact_id: &str) -> Result<Option<Artifact>, StoreError>;

    /// Artifacts uploaded on the given date, optionally filtered by kind.
    fn artifacts_by_date(
        &self,
        date: NaiveDate,
        kind: Option<ArtifactKind>,
    ) -> Result<Vec<Artifact>, StoreError>;

    /// Most recent artifacts, newest first.
    fn recent_artifacts(&self, limit: u32) -> Result<Vec<Artifact>, StoreError>;
}
