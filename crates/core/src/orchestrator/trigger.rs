//! Main daily trigger.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};

use crate::dispatcher::{DispatchRequest, JobDispatcher};
use crate::episode::{next_episode, CategoryTree};
use crate::store::{RunPatch, RunStatus, StatusStore, TriggerType};

use super::types::{OrchestratorError, TriggerOutcome};

/// Dispatches the next episode in the category sequence.
///
/// Fires once per day. There is no local retry; a failed dispatch is
/// recorded so the backup check finds it hours later.
pub struct TriggerController {
    store: Arc<dyn StatusStore>,
    dispatcher: Arc<dyn JobDispatcher>,
    tree: CategoryTree,
}

impl TriggerController {
    pub fn new(
        store: Arc<dyn StatusStore>,
        dispatcher: Arc<dyn JobDispatcher>,
        tree: CategoryTree,
    ) -> Self {
        Self {
            store,
            dispatcher,
            tree,
        }
    }

    /// The descriptor the next dispatch will use. The episode history
    /// only advances when production completes, so this is stable
    /// until an artifact lands.
    pub fn next_descriptor(&self) -> Result<crate::episode::EpisodeDescriptor, OrchestratorError> {
        let previous = self.store.latest_episode()?;
        Ok(next_episode(&self.tree, previous.as_ref()))
    }

    /// Run the main trigger once.
    pub async fn run(&self) -> Result<TriggerOutcome, OrchestratorError> {
        let descriptor = self.next_descriptor()?;
        let request = DispatchRequest::new(descriptor.clone());

        info!(episode = %descriptor, "main trigger: dispatching");

        match self.dispatcher.dispatch(&request).await {
            Ok(receipt) => {
                crate::metrics::DISPATCHES_TOTAL
                    .with_label_values(&["main", "success"])
                    .inc();
                let run = self.store.upsert_run(
                    RunPatch::new(&receipt.run_id)
                        .status(RunStatus::Triggered)
                        .trigger_type(TriggerType::Main)
                        .descriptor(descriptor)
                        .triggered_at(Utc::now()),
                )?;
                info!(run_id = %run.run_id, episode = %run.descriptor, "main trigger: run recorded");
                Ok(TriggerOutcome {
                    run_id: run.run_id,
                    descriptor: run.descriptor,
                })
            }
            Err(e) => {
                crate::metrics::DISPATCHES_TOTAL
                    .with_label_values(&["main", "error"])
                    .inc();
                // The failed record is what the backup check keys on.
                error!(episode = %descriptor, error = %e, "main trigger: dispatch failed");
                let run_id = format!("failed_{}", uuid::Uuid::new_v4().simple());
                self.store.upsert_run(
                    RunPatch::new(run_id)
                        .status(RunStatus::Failed)
                        .trigger_type(TriggerType::Main)
                        .descriptor(descriptor)
                        .triggered_at(Utc::now())
                        .error(e.to_string()),
                )?;
                Err(e.into())
            }
        }
    }
}
