//! Persisted orchestration state types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::episode::EpisodeDescriptor;

/// Lifecycle status of a workflow run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The main daily dispatch was accepted by the workflow runner.
    Triggered,
    /// A backup retry dispatch was accepted.
    BackupTriggered,
    /// The dispatch itself failed; nothing is running.
    Failed,
    /// The run's output was received and registered as an artifact.
    Uploaded,
}

impl RunStatus {
    /// Stable string form used in storage and filters.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Triggered => "triggered",
            RunStatus::BackupTriggered => "backup_triggered",
            RunStatus::Failed => "failed",
            RunStatus::Uploaded => "uploaded",
        }
    }

    /// Parse the stable string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "triggered" => Some(RunStatus::Triggered),
            "backup_triggered" => Some(RunStatus::BackupTriggered),
            "failed" => Some(RunStatus::Failed),
            "uploaded" => Some(RunStatus::Uploaded),
            _ => None,
        }
    }
}

/// Which scheduled path dispatched a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    /// The nightly main trigger.
    Main,
    /// The backup-check trigger.
    Backup,
}

impl TriggerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerType::Main => "main",
            TriggerType::Backup => "backup",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "main" => Some(TriggerType::Main),
            "backup" => Some(TriggerType::Backup),
            _ => None,
        }
    }
}

/// One dispatch attempt of the production workflow.
///
/// Runs are never deleted; a backup retry creates a new run with its
/// own `run_id`, linked to the day it recovers via
/// `original_trigger_date`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowRun {
    /// Unique run identifier issued at dispatch time.
    pub run_id: String,
    /// Current lifecycle status.
    pub status: RunStatus,
    /// Which scheduled path dispatched this run.
    pub trigger_type: TriggerType,
    /// The episode this run produces.
    pub descriptor: EpisodeDescriptor,
    /// When the dispatch was made.
    pub triggered_at: DateTime<Utc>,
    /// For backup runs, the date of the main attempt being recovered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_trigger_date: Option<NaiveDate>,
    /// Last pipeline stage reported by a progress notification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_stage: Option<String>,
    /// Status string reported with the last pipeline stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_stage_status: Option<String>,
    /// Error message, when the dispatch failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Last write timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Partial update for a workflow run, merged by `run_id`.
///
/// Unset fields are left untouched in storage, so a progress webhook
/// and a trigger write can interleave without clobbering each other.
#[derive(Debug, Clone, Default)]
pub struct RunPatch {
    pub run_id: String,
    pub status: Option<RunStatus>,
    pub trigger_type: Option<TriggerType>,
    pub descriptor: Option<EpisodeDescriptor>,
    pub triggered_at: Option<DateTime<Utc>>,
    pub original_trigger_date: Option<NaiveDate>,
    pub last_stage: Option<String>,
    pub last_stage_status: Option<String>,
    pub error: Option<String>,
}

impl RunPatch {
    /// Start a patch for the given run.
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            ..Default::default()
        }
    }

    pub fn status(mut self, status: RunStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn trigger_type(mut self, trigger_type: TriggerType) -> Self {
        self.trigger_type = Some(trigger_type);
        self
    }

    pub fn descriptor(mut self, descriptor: EpisodeDescriptor) -> Self {
        self.descriptor = Some(descriptor);
        self
    }

    pub fn triggered_at(mut self, at: DateTime<Utc>) -> Self {
        self.triggered_at = Some(at);
        self
    }

    pub fn original_trigger_date(mut self, date: NaiveDate) -> Self {
        self.original_trigger_date = Some(date);
        self
    }

    pub fn stage(mut self, stage: impl Into<String>, status: impl Into<String>) -> Self {
        self.last_stage = Some(stage.into());
        self.last_stage_status = Some(status.into());
        self
    }

    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Kind of a produced artifact.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// The main daily item, published first.
    Primary,
    /// The companion item, published after and cross-linked to the
    /// primary one.
    Secondary,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Primary => "primary",
            ArtifactKind::Secondary => "secondary",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "primary" => Some(ArtifactKind::Primary),
            "secondary" => Some(ArtifactKind::Secondary),
            _ => None,
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visibility of a published artifact on the media host.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Reachable only by direct link.
    Unlisted,
    /// Discoverable.
    Public,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Unlisted => "unlisted",
            Visibility::Public => "public",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unlisted" => Some(Visibility::Unlisted),
            "public" => Some(Visibility::Public),
            _ => None,
        }
    }
}

/// Lifecycle status of an artifact.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStatus {
    /// Registered on the media host, still unlisted.
    Uploaded,
    /// Flipped to public by a publish controller.
    Published,
    /// A publish attempt failed; the error is recorded.
    Failed,
}

impl ArtifactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactStatus::Uploaded => "uploaded",
            ArtifactStatus::Published => "published",
            ArtifactStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "uploaded" => Some(ArtifactStatus::Uploaded),
            "published" => Some(ArtifactStatus::Published),
            "failed" => Some(ArtifactStatus::Failed),
            _ => None,
        }
    }
}

/// A produced media item registered on the media host.
///
/// Artifacts are an immutable history of production: they are created
/// unlisted when the workflow output is received and only ever move
/// forward (uploaded -> published, or uploaded -> failed with the
/// error preserved).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Artifact {
    /// External upload identifier from the media host.
    pub artifact_id: String,
    /// The run that produced this artifact, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    pub kind: ArtifactKind,
    pub title: String,
    /// Description as uploaded, kept so the cross-link append can be
    /// checked for idempotence without a publisher read-back.
    #[serde(default)]
    pub description: String,
    pub visibility: Visibility,
    pub status: ArtifactStatus,
    /// Day the artifact was uploaded; publish controllers select on it.
    pub upload_date: NaiveDate,
    /// Direct watch URL on the media host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    /// URL of the primary artifact linked from this one (secondary only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_link_url: Option<String>,
    /// Human-readable publish slot label, e.g. "17:30".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_slot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update for an artifact, merged by `artifact_id`.
#[derive(Debug, Clone, Default)]
pub struct ArtifactPatch {
    pub artifact_id: String,
    pub run_id: Option<String>,
    pub kind: Option<ArtifactKind>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub visibility: Option<Visibility>,
    pub status: Option<ArtifactStatus>,
    pub upload_date: Option<NaiveDate>,
    pub watch_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub cross_link_url: Option<String>,
    pub scheduled_slot: Option<String>,
    pub error: Option<String>,
}

impl ArtifactPatch {
    /// Start a patch for the given artifact.
    pub fn new(artifact_id: impl Into<String>) -> Self {
        Self {
            artifact_id: artifact_id.into(),
            ..Default::default()
        }
    }

    pub fn run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    pub fn kind(mut self, kind: ArtifactKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn status(mut self, status: ArtifactStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn upload_date(mut self, date: NaiveDate) -> Self {
        self.upload_date = Some(date);
        self
    }

    pub fn watch_url(mut self, url: impl Into<String>) -> Self {
        self.watch_url = Some(url.into());
        self
    }

    pub fn published_at(mut self, at: DateTime<Utc>) -> Self {
        self.published_at = Some(at);
        self
    }

    pub fn cross_link_url(mut self, url: impl Into<String>) -> Self {
        self.cross_link_url = Some(url.into());
        self
    }

    pub fn scheduled_slot(mut self, slot: impl Into<String>) -> Self {
        self.scheduled_slot = Some(slot.into());
        self
    }

    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips() {
        for status in [
            RunStatus::Triggered,
            RunStatus::BackupTriggered,
            RunStatus::Failed,
            RunStatus::Uploaded,
        ] {
            assert_eq!(RunStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(RunStatus::parse("bogus"), None);
    }

    #[test]
    fn test_artifact_enums_round_trip() {
        assert_eq!(ArtifactKind::parse("primary"), Some(ArtifactKind::Primary));
        assert_eq!(
            ArtifactKind::parse("secondary"),
            Some(ArtifactKind::Secondary)
        );
        assert_eq!(Visibility::parse("unlisted"), Some(Visibility::Unlisted));
        assert_eq!(Visibility::parse("public"), Some(Visibility::Public));
        assert_eq!(
            ArtifactStatus::parse("published"),
            Some(ArtifactStatus::Published)
        );
        assert_eq!(ArtifactStatus::parse(""), None);
    }

    #[test]
    fn test_run_status_serde_uses_snake_case() {
        let json = serde_json::to_string(&RunStatus::BackupTriggered).unwrap();
        assert_eq!(json, "\"backup_triggered\"");
    }

    #[test]
    fn test_run_patch_builder() {
        let patch = RunPatch::new("run_1")
            .status(RunStatus::Triggered)
            .trigger_type(TriggerType::Main)
            .stage("video_rendered", "completed");
        assert_eq!(patch.run_id, "run_1");
        assert_eq!(patch.status, Some(RunStatus::Triggered));
        assert_eq!(patch.last_stage.as_deref(), Some("video_rendered"));
        assert!(patch.descriptor.is_none());
        assert!(patch.error.is_none());
    }
}
