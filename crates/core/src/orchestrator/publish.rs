//! Scheduled publish controllers.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use crate::publisher::Publisher;
use crate::store::{Artifact, ArtifactKind, ArtifactPatch, ArtifactStatus, StatusStore, Visibility};

use super::types::{OrchestratorError, PublishItemResult, PublishReport};

/// Flips one kind of artifact public at its daily slot.
///
/// Two instances exist, one per kind. The secondary instance also
/// appends a companion link to each description, pointing at the
/// primary artifact published earlier the same day.
pub struct PublishController {
    store: Arc<dyn StatusStore>,
    publisher: Arc<dyn Publisher>,
    kind: ArtifactKind,
    cross_link_template: String,
}

impl PublishController {
    pub fn new(
        store: Arc<dyn StatusStore>,
        publisher: Arc<dyn Publisher>,
        kind: ArtifactKind,
        cross_link_template: impl Into<String>,
    ) -> Self {
        Self {
            store,
            publisher,
            kind,
            cross_link_template: cross_link_template.into(),
        }
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// Run the publish pass for today.
    pub async fn run(&self) -> Result<PublishReport, OrchestratorError> {
        self.run_for_date(Utc::now().date_naive()).await
    }

    /// Run the publish pass for an explicit date.
    pub async fn run_for_date(&self, date: NaiveDate) -> Result<PublishReport, OrchestratorError> {
        let candidates: Vec<Artifact> = self
            .store
            .artifacts_by_date(date, Some(self.kind))?
            .into_iter()
            .filter(|a| a.visibility == Visibility::Unlisted)
            .collect();

        if candidates.is_empty() {
            info!(kind = %self.kind, date = %date, "publish: nothing to do");
            return Ok(PublishReport::empty());
        }

        let cross_link = match self.kind {
            ArtifactKind::Primary => None,
            ArtifactKind::Secondary => self.primary_watch_url(date)?,
        };
        if self.kind == ArtifactKind::Secondary && cross_link.is_none() {
            warn!(date = %date, "publish: no primary artifact to cross-link today");
        }

        // Sequential on purpose: one slow external call must not race
        // state writes for another artifact.
        let mut items = Vec::with_capacity(candidates.len());
        for artifact in candidates {
            items.push(self.publish_one(artifact, cross_link.as_deref()).await);
        }

        let published = items.iter().filter(|i| i.published).count() as u32;
        let report = PublishReport {
            published,
            total: items.len() as u32,
            items,
        };
        info!(
            kind = %self.kind,
            date = %date,
            published = report.published,
            total = report.total,
            "publish: pass complete"
        );
        Ok(report)
    }

    /// Watch URL of today's primary artifact, if one exists.
    fn primary_watch_url(&self, date: NaiveDate) -> Result<Option<String>, OrchestratorError> {
        let primary = self
            .store
            .artifacts_by_date(date, Some(ArtifactKind::Primary))?;
        Ok(primary.into_iter().find_map(|a| a.watch_url))
    }

    async fn publish_one(&self, artifact: Artifact, cross_link: Option<&str>) -> PublishItemResult {
        let mut cross_linked = false;

        if let Some(url) = cross_link {
            match self.append_cross_link(&artifact, url).await {
                Ok(appended) => cross_linked = appended,
                Err(e) => return self.record_failure(artifact, e).await,
            }
        }

        match self
            .publisher
            .set_visibility(&artifact.artifact_id, Visibility::Public)
            .await
        {
            Ok(()) => {
                crate::metrics::PUBLISHES_TOTAL
                    .with_label_values(&[self.kind.as_str(), "success"])
                    .inc();
                let patch = ArtifactPatch::new(&artifact.artifact_id)
                    .visibility(Visibility::Public)
                    .status(ArtifactStatus::Published)
                    .published_at(Utc::now());
                if let Err(e) = self.store.upsert_artifact(patch) {
                    warn!(
                        artifact_id = %artifact.artifact_id,
                        error = %e,
                        "publish: visibility flipped but state write failed"
                    );
                }
                PublishItemResult {
                    artifact_id: artifact.artifact_id,
                    title: artifact.title,
                    published: true,
                    cross_linked,
                    error: None,
                }
            }
            Err(e) => self.record_failure(artifact, e.into()).await,
        }
    }

    /// Append the companion link to the stored description if absent.
    /// Returns whether the link is present afterwards.
    async fn append_cross_link(
        &self,
        artifact: &Artifact,
        url: &str,
    ) -> Result<bool, OrchestratorError> {
        if artifact.description.contains(url) {
            // Already appended by an earlier run.
            return Ok(true);
        }

        let block = self.cross_link_template.replace("{url}", url);
        let description = format!("{}{}", artifact.description, block);
        self.publisher
            .set_description(&artifact.artifact_id, &description)
            .await?;
        self.store.upsert_artifact(
            ArtifactPatch::new(&artifact.artifact_id)
                .description(description)
                .cross_link_url(url),
        )?;
        Ok(true)
    }

    async fn record_failure(&self, artifact: Artifact, e: OrchestratorError) -> PublishItemResult {
        crate::metrics::PUBLISHES_TOTAL
            .with_label_values(&[self.kind.as_str(), "error"])
            .inc();
        warn!(artifact_id = %artifact.artifact_id, error = %e, "publish: item failed");
        let patch = ArtifactPatch::new(&artifact.artifact_id)
            .status(ArtifactStatus::Failed)
            .error(e.to_string());
        if let Err(store_err) = self.store.upsert_artifact(patch) {
            warn!(
                artifact_id = %artifact.artifact_id,
                error = %store_err,
                "publish: failed to record item failure"
            );
        }
        PublishItemResult {
            artifact_id: artifact.artifact_id,
            title: artifact.title,
            published: false,
            cross_linked: false,
            error: Some(e.to_string()),
        }
    }
}
