//! Workflow-run and artifact status persistence.
//!
//! The [`StatusStore`] trait is the single writer of orchestration
//! state. Controllers and the webhook receiver all write through it
//! with patch types that merge field-by-field, so concurrent paths
//! (scheduled triggers vs. inbound webhooks) cannot clobber each
//! other's fields.

mod sqlite;
mod store;
mod types;

pub use sqlite::SqliteStatusStore;
pub use store::{StatusStore, StoreError};
pub use types::{
    Artifact, ArtifactKind, ArtifactPatch, ArtifactStatus, RunPatch, RunStatus, TriggerType,
    Visibility, WorkflowRun,
};
