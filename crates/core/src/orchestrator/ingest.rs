//! Webhook ingest.
//!
//! Turns the two inbound notification kinds into state updates:
//! progress notifications are merged into the run record, and a ready
//! notification uploads the finished media and registers the artifact.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::metadata::{EpisodeMetadata, MetadataFetcher};
use crate::store::{
    Artifact, ArtifactKind, ArtifactPatch, RunPatch, RunStatus, StatusStore, WorkflowRun,
};
use crate::uploader::{UploadRequest, Uploader};

use super::config::ScheduleConfig;
use super::types::OrchestratorError;

/// Pipeline stages the workflow runner reports.
///
/// Unknown stage names are accepted and recorded verbatim; the runner
/// grows stages faster than this service ships.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    ScriptGenerated,
    AudioGenerated,
    AssetsDownloaded,
    ThumbnailGenerated,
    VideoRendered,
    UploadReady,
    #[serde(other)]
    Unknown,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::ScriptGenerated => "script_generated",
            PipelineStage::AudioGenerated => "audio_generated",
            PipelineStage::AssetsDownloaded => "assets_downloaded",
            PipelineStage::ThumbnailGenerated => "thumbnail_generated",
            PipelineStage::VideoRendered => "video_rendered",
            PipelineStage::UploadReady => "upload_ready",
            PipelineStage::Unknown => "unknown",
        }
    }
}

/// A stage-completion notification from the workflow runner.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressNotification {
    pub run_id: String,
    pub action: PipelineStage,
    pub status: String,
}

/// One output file as published by the storage host.
#[derive(Debug, Clone, Deserialize)]
pub struct FileReference {
    pub url: String,
}

impl FileReference {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// References to the finished output files, as published by the
/// storage host. Exactly one media reference is expected per
/// notification; thumbnail and script are optional enrichment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaReferences {
    #[serde(default)]
    pub primary_media: Option<FileReference>,
    #[serde(default)]
    pub secondary_media: Option<FileReference>,
    #[serde(default)]
    pub thumbnail: Option<FileReference>,
    /// The production script document; carries the episode metadata.
    #[serde(default)]
    pub script: Option<FileReference>,
}

/// A media-ready notification from the storage host.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadyNotification {
    pub run_id: String,
    pub files: MediaReferences,
}

/// Applies inbound notifications to the status store and drives the
/// upload step for ready notifications.
pub struct IngestController {
    store: Arc<dyn StatusStore>,
    uploader: Arc<dyn Uploader>,
    metadata: Arc<dyn MetadataFetcher>,
    schedule: ScheduleConfig,
}

impl IngestController {
    pub fn new(
        store: Arc<dyn StatusStore>,
        uploader: Arc<dyn Uploader>,
        metadata: Arc<dyn MetadataFetcher>,
        schedule: ScheduleConfig,
    ) -> Self {
        Self {
            store,
            uploader,
            metadata,
            schedule,
        }
    }

    /// Merge a progress notification into its run record.
    ///
    /// Observational only: the run's lifecycle status never changes
    /// here, whatever stage is reported.
    pub fn apply_progress(
        &self,
        notification: &ProgressNotification,
    ) -> Result<WorkflowRun, OrchestratorError> {
        crate::metrics::WEBHOOKS_RECEIVED
            .with_label_values(&["progress"])
            .inc();
        if self.store.get_run(&notification.run_id)?.is_none() {
            crate::metrics::UNKNOWN_RUN_NOTIFICATIONS.inc();
            return Err(OrchestratorError::UnknownRun(notification.run_id.clone()));
        }

        let run = self.store.upsert_run(
            RunPatch::new(&notification.run_id)
                .stage(notification.action.as_str(), &notification.status),
        )?;
        info!(
            run_id = %run.run_id,
            stage = notification.action.as_str(),
            status = %notification.status,
            "progress recorded"
        );
        Ok(run)
    }

    /// Handle a media-ready notification: resolve metadata, upload the
    /// media unlisted and register the artifact.
    pub async fn handle_ready(
        &self,
        notification: &ReadyNotification,
    ) -> Result<Artifact, OrchestratorError> {
        crate::metrics::WEBHOOKS_RECEIVED
            .with_label_values(&["media_ready"])
            .inc();
        let files = &notification.files;
        let (kind, media_url) = match (&files.primary_media, &files.secondary_media) {
            (Some(file), _) => (ArtifactKind::Primary, file.url.clone()),
            (None, Some(file)) => (ArtifactKind::Secondary, file.url.clone()),
            (None, None) => {
                return Err(OrchestratorError::InvalidNotification(
                    "ready notification carries no media reference".to_string(),
                ))
            }
        };

        let script = files.script.as_ref().map(|f| f.url.as_str());
        let metadata = self.resolve_metadata(script).await;

        let receipt = self
            .uploader
            .upload_unlisted(&UploadRequest {
                media_url,
                thumbnail_url: files.thumbnail.as_ref().map(|f| f.url.clone()),
                metadata: metadata.clone(),
                kind,
            })
            .await
            .inspect_err(|_| {
                crate::metrics::UPLOADS_TOTAL
                    .with_label_values(&[kind.as_str(), "error"])
                    .inc();
            })?;
        crate::metrics::UPLOADS_TOTAL
            .with_label_values(&[kind.as_str(), "success"])
            .inc();

        let slot = match kind {
            ArtifactKind::Primary => &self.schedule.publish_primary,
            ArtifactKind::Secondary => &self.schedule.publish_secondary,
        };

        let mut patch = ArtifactPatch::new(&receipt.artifact_id)
            .run_id(&notification.run_id)
            .kind(kind)
            .title(&metadata.title)
            .description(&metadata.description)
            .upload_date(Utc::now().date_naive())
            .scheduled_slot(slot);
        if let Some(url) = &receipt.watch_url {
            patch = patch.watch_url(url);
        }
        let artifact = self.store.upsert_artifact(patch)?;

        self.complete_run(&notification.run_id)?;

        info!(
            artifact_id = %artifact.artifact_id,
            run_id = %notification.run_id,
            kind = %kind,
            slot = %slot,
            "artifact registered"
        );
        Ok(artifact)
    }

    async fn resolve_metadata(&self, reference: Option<&str>) -> EpisodeMetadata {
        let Some(url) = reference else {
            warn!("ready notification without script reference, using defaults");
            crate::metrics::METADATA_FALLBACKS.inc();
            return EpisodeMetadata::default();
        };
        match self.metadata.fetch(url).await {
            Ok(metadata) => metadata,
            Err(e) => {
                // Enrichment only; the upload must still happen.
                warn!(url = %url, error = %e, "metadata fetch failed, using defaults");
                crate::metrics::METADATA_FALLBACKS.inc();
                EpisodeMetadata::default()
            }
        }
    }

    /// Mark the producing run uploaded and advance the episode history.
    fn complete_run(&self, run_id: &str) -> Result<(), OrchestratorError> {
        match self.store.get_run(run_id)? {
            Some(run) => {
                if run.status != RunStatus::Uploaded {
                    self.store.record_episode(&run.descriptor)?;
                    self.store
                        .upsert_run(RunPatch::new(run_id).status(RunStatus::Uploaded))?;
                }
                Ok(())
            }
            None => {
                // Manually produced output has no run; register anyway.
                warn!(run_id = %run_id, "ready notification for unknown run");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::episode::EpisodeDescriptor;
    use crate::store::{SqliteStatusStore, TriggerType, Visibility};
    use crate::testing::{MockMetadataFetcher, MockUploader};

    fn setup() -> (
        Arc<SqliteStatusStore>,
        Arc<MockUploader>,
        Arc<MockMetadataFetcher>,
        IngestController,
    ) {
        let store = Arc::new(SqliteStatusStore::in_memory().unwrap());
        let uploader = Arc::new(MockUploader::new());
        let metadata = Arc::new(MockMetadataFetcher::new());
        let controller = IngestController::new(
            Arc::clone(&store) as Arc<dyn StatusStore>,
            Arc::clone(&uploader) as Arc<dyn Uploader>,
            Arc::clone(&metadata) as Arc<dyn MetadataFetcher>,
            ScheduleConfig::default(),
        );
        (store, uploader, metadata, controller)
    }

    fn descriptor() -> EpisodeDescriptor {
        EpisodeDescriptor::new("history", "ancient-rome", 3)
    }

    fn seed_run(store: &SqliteStatusStore, run_id: &str) {
        store
            .upsert_run(
                RunPatch::new(run_id)
                    .status(RunStatus::Triggered)
                    .trigger_type(TriggerType::Main)
                    .descriptor(descriptor())
                    .triggered_at(Utc::now()),
            )
            .unwrap();
    }

    #[test]
    fn test_pipeline_stage_accepts_unknown_names() {
        let stage: PipelineStage = serde_json::from_str("\"color_graded\"").unwrap();
        assert_eq!(stage, PipelineStage::Unknown);
        let stage: PipelineStage = serde_json::from_str("\"video_rendered\"").unwrap();
        assert_eq!(stage, PipelineStage::VideoRendered);
    }

    #[tokio::test]
    async fn test_progress_merges_stage_without_touching_status() {
        let (store, _uploader, _metadata, controller) = setup();
        seed_run(&store, "run_42");

        let run = controller
            .apply_progress(&ProgressNotification {
                run_id: "run_42".to_string(),
                action: PipelineStage::VideoRendered,
                status: "completed".to_string(),
            })
            .unwrap();

        assert_eq!(run.status, RunStatus::Triggered);
        assert_eq!(run.last_stage.as_deref(), Some("video_rendered"));
        assert_eq!(run.last_stage_status.as_deref(), Some("completed"));
    }

    #[tokio::test]
    async fn test_progress_for_unknown_run_is_rejected() {
        let (_store, _uploader, _metadata, controller) = setup();
        let err = controller
            .apply_progress(&ProgressNotification {
                run_id: "run_missing".to_string(),
                action: PipelineStage::ScriptGenerated,
                status: "completed".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::UnknownRun(_)));
    }

    #[tokio::test]
    async fn test_ready_with_primary_media_registers_primary_artifact() {
        let (store, uploader, metadata, controller) = setup();
        seed_run(&store, "run_42");
        metadata.set(
            "https://cdn.example.com/meta.json",
            EpisodeMetadata {
                title: "Ancient Rome, part 3".to_string(),
                description: "A deep dive.".to_string(),
                tags: vec!["history".to_string()],
                category: None,
            },
        );

        let artifact = controller
            .handle_ready(&ReadyNotification {
                run_id: "run_42".to_string(),
                files: MediaReferences {
                    primary_media: Some(FileReference::new("https://cdn.example.com/long.mp4")),
                    thumbnail: Some(FileReference::new("https://cdn.example.com/thumb.jpg")),
                    script: Some(FileReference::new("https://cdn.example.com/meta.json")),
                    ..Default::default()
                },
            })
            .await
            .unwrap();

        assert_eq!(artifact.kind, ArtifactKind::Primary);
        assert_eq!(artifact.visibility, Visibility::Unlisted);
        assert_eq!(artifact.upload_date, Utc::now().date_naive());
        assert_eq!(artifact.title, "Ancient Rome, part 3");
        assert_eq!(artifact.run_id.as_deref(), Some("run_42"));
        assert_eq!(artifact.scheduled_slot.as_deref(), Some("17:00"));

        let uploads = uploader.requests();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].media_url, "https://cdn.example.com/long.mp4");

        // The producing run completes and the sequence advances.
        let run = store.get_run("run_42").unwrap().unwrap();
        assert_eq!(run.status, RunStatus::Uploaded);
        assert_eq!(store.latest_episode().unwrap(), Some(descriptor()));
    }

    #[tokio::test]
    async fn test_ready_with_secondary_media_uses_secondary_slot() {
        let (store, _uploader, _metadata, controller) = setup();
        seed_run(&store, "run_42");

        let artifact = controller
            .handle_ready(&ReadyNotification {
                run_id: "run_42".to_string(),
                files: MediaReferences {
                    secondary_media: Some(FileReference::new("https://cdn.example.com/short.mp4")),
                    ..Default::default()
                },
            })
            .await
            .unwrap();

        assert_eq!(artifact.kind, ArtifactKind::Secondary);
        assert_eq!(artifact.scheduled_slot.as_deref(), Some("17:30"));
    }

    #[tokio::test]
    async fn test_metadata_failure_falls_back_to_defaults() {
        let (store, _uploader, metadata, controller) = setup();
        seed_run(&store, "run_42");
        metadata.fail_all();

        let artifact = controller
            .handle_ready(&ReadyNotification {
                run_id: "run_42".to_string(),
                files: MediaReferences {
                    primary_media: Some(FileReference::new("https://cdn.example.com/long.mp4")),
                    script: Some(FileReference::new("https://cdn.example.com/meta.json")),
                    ..Default::default()
                },
            })
            .await
            .unwrap();

        assert_eq!(artifact.title, "Untitled");
    }

    #[tokio::test]
    async fn test_ready_without_media_is_rejected() {
        let (_store, uploader, _metadata, controller) = setup();
        let err = controller
            .handle_ready(&ReadyNotification {
                run_id: "run_42".to_string(),
                files: MediaReferences::default(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidNotification(_)));
        assert!(uploader.requests().is_empty());
    }

    #[tokio::test]
    async fn test_ready_for_unknown_run_still_registers_artifact() {
        let (store, _uploader, _metadata, controller) = setup();

        let artifact = controller
            .handle_ready(&ReadyNotification {
                run_id: "run_manual".to_string(),
                files: MediaReferences {
                    primary_media: Some(FileReference::new("https://cdn.example.com/long.mp4")),
                    ..Default::default()
                },
            })
            .await
            .unwrap();

        assert_eq!(artifact.run_id.as_deref(), Some("run_manual"));
        // No run, so the episode history stays put.
        assert_eq!(store.latest_episode().unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_ready_does_not_advance_sequence_twice() {
        let (store, _uploader, _metadata, controller) = setup();
        seed_run(&store, "run_42");
        let notification = ReadyNotification {
            run_id: "run_42".to_string(),
            files: MediaReferences {
                primary_media: Some(FileReference::new("https://cdn.example.com/long.mp4")),
                ..Default::default()
            },
        };

        controller.handle_ready(&notification).await.unwrap();
        controller.handle_ready(&notification).await.unwrap();

        // Second delivery re-registers the artifact but the run was
        // already uploaded, so history has a single entry.
        let recorded = store.latest_episode().unwrap().unwrap();
        assert_eq!(recorded, descriptor());
        let runs = store.recent_runs(10).unwrap();
        assert_eq!(runs.len(), 1);
    }
}
