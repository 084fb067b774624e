//! Backup retry check.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::dispatcher::{DispatchRequest, JobDispatcher};
use crate::episode::{next_episode, CategoryTree, EpisodeDescriptor};
use crate::store::{RunPatch, RunStatus, StatusStore, TriggerType, WorkflowRun};

use super::config::OrchestratorConfig;
use super::types::{BackupOutcome, BackupSkipReason, OrchestratorError};

/// Decides whether yesterday's production needs a retry dispatch.
///
/// Runs hours after the main trigger so that slow but healthy jobs
/// have time to finish. A retry reuses yesterday's episode descriptor;
/// the sequence never advances here.
pub struct BackupController {
    store: Arc<dyn StatusStore>,
    dispatcher: Arc<dyn JobDispatcher>,
    tree: CategoryTree,
    config: OrchestratorConfig,
}

impl BackupController {
    pub fn new(
        store: Arc<dyn StatusStore>,
        dispatcher: Arc<dyn JobDispatcher>,
        tree: CategoryTree,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            store,
            dispatcher,
            tree,
            config,
        }
    }

    /// Run the backup check against yesterday, relative to now.
    pub async fn run(&self) -> Result<BackupOutcome, OrchestratorError> {
        self.run_at(Utc::now()).await
    }

    /// Run the backup check with an explicit notion of "now".
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<BackupOutcome, OrchestratorError> {
        let yesterday = now.date_naive() - Duration::days(1);
        let run = self.store.run_for_date(yesterday)?;

        if let Some(skip) = self.skip_reason(run.as_ref(), yesterday, now)? {
            info!(date = %yesterday, reason = skip.as_str(), "backup check: no dispatch");
            crate::metrics::BACKUP_SKIPS_TOTAL
                .with_label_values(&[skip.as_str()])
                .inc();
            return Ok(BackupOutcome::NotNeeded { reason: skip });
        }

        // A missing run still means yesterday produced nothing, so the
        // retry descriptor is re-derived from the episode history.
        let descriptor = match &run {
            Some(run) => run.descriptor.clone(),
            None => {
                warn!(date = %yesterday, "backup check: no run recorded, re-deriving descriptor");
                let previous = self.store.latest_episode()?;
                next_episode(&self.tree, previous.as_ref())
            }
        };

        let attempt = self.store.count_backup_runs(yesterday)? + 1;
        self.dispatch_backup(descriptor, yesterday, attempt, now)
            .await
    }

    fn skip_reason(
        &self,
        run: Option<&WorkflowRun>,
        date: chrono::NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Option<BackupSkipReason>, OrchestratorError> {
        let Some(run) = run else {
            return Ok(None);
        };

        match run.status {
            RunStatus::Uploaded => Ok(Some(BackupSkipReason::AlreadyUploaded)),
            RunStatus::Triggered | RunStatus::BackupTriggered => {
                let grace = Duration::hours(i64::from(self.config.grace_period_hours));
                if now - run.triggered_at < grace {
                    Ok(Some(BackupSkipReason::StillProcessing))
                } else {
                    self.attempts_gate(date)
                }
            }
            RunStatus::Failed => self.attempts_gate(date),
        }
    }

    fn attempts_gate(
        &self,
        date: chrono::NaiveDate,
    ) -> Result<Option<BackupSkipReason>, OrchestratorError> {
        let used = self.store.count_backup_runs(date)?;
        if used >= self.config.max_backup_attempts {
            Ok(Some(BackupSkipReason::AttemptsExhausted))
        } else {
            Ok(None)
        }
    }

    async fn dispatch_backup(
        &self,
        descriptor: EpisodeDescriptor,
        original_date: chrono::NaiveDate,
        attempt: u32,
        now: DateTime<Utc>,
    ) -> Result<BackupOutcome, OrchestratorError> {
        let request = DispatchRequest::new(descriptor.clone()).retry(attempt);
        info!(episode = %descriptor, attempt, "backup check: dispatching retry");

        match self.dispatcher.dispatch(&request).await {
            Ok(receipt) => {
                crate::metrics::DISPATCHES_TOTAL
                    .with_label_values(&["backup", "success"])
                    .inc();
                let run = self.store.upsert_run(
                    RunPatch::new(&receipt.run_id)
                        .status(RunStatus::BackupTriggered)
                        .trigger_type(TriggerType::Backup)
                        .descriptor(descriptor)
                        .triggered_at(now)
                        .original_trigger_date(original_date),
                )?;
                Ok(BackupOutcome::Triggered {
                    run_id: run.run_id,
                    descriptor: run.descriptor,
                    attempt,
                })
            }
            Err(e) => {
                crate::metrics::DISPATCHES_TOTAL
                    .with_label_values(&["backup", "error"])
                    .inc();
                let run_id = format!("failed_{}", uuid::Uuid::new_v4().simple());
                self.store.upsert_run(
                    RunPatch::new(run_id)
                        .status(RunStatus::Failed)
                        .trigger_type(TriggerType::Backup)
                        .descriptor(descriptor)
                        .triggered_at(now)
                        .original_trigger_date(original_date)
                        .error(e.to_string()),
                )?;
                Err(e.into())
            }
        }
    }
}
