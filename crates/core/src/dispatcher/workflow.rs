//! HTTP workflow dispatcher.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{DispatchError, DispatchReceipt, DispatchRequest, JobDispatcher};

fn default_git_ref() -> String {
    "main".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Configuration for the HTTP workflow dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDispatcherConfig {
    /// Dispatch endpoint URL.
    pub url: String,
    /// Bearer token for the dispatch endpoint.
    pub token: String,
    /// Git ref the workflow runs on.
    #[serde(default = "default_git_ref")]
    pub git_ref: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Dispatches production jobs to a CI-style workflow endpoint.
///
/// The endpoint accepts a ref plus string-valued inputs and replies
/// with an empty success body, so the run id is generated here and
/// passed through as an input for later correlation.
pub struct WorkflowDispatcher {
    client: reqwest::Client,
    config: WorkflowDispatcherConfig,
}

#[derive(Debug, Serialize)]
struct DispatchBody {
    #[serde(rename = "ref")]
    git_ref: String,
    inputs: DispatchInputs,
}

// Workflow inputs are strings regardless of their logical type.
#[derive(Debug, Serialize)]
struct DispatchInputs {
    run_id: String,
    main_category: String,
    sub_category: String,
    episode: String,
    is_retry: String,
    attempt: String,
}

impl WorkflowDispatcher {
    pub fn new(config: WorkflowDispatcherConfig) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DispatchError::Http(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn new_run_id() -> String {
        format!("run_{}", uuid::Uuid::new_v4().simple())
    }
}

#[async_trait]
impl JobDispatcher for WorkflowDispatcher {
    fn backend_name(&self) -> &str {
        "workflow-http"
    }

    async fn dispatch(&self, request: &DispatchRequest) -> Result<DispatchReceipt, DispatchError> {
        let run_id = Self::new_run_id();
        let body = DispatchBody {
            git_ref: self.config.git_ref.clone(),
            inputs: DispatchInputs {
                run_id: run_id.clone(),
                main_category: request.descriptor.main_category.clone(),
                sub_category: request.descriptor.sub_category.clone(),
                episode: request.descriptor.episode.to_string(),
                is_retry: request.is_retry.to_string(),
                attempt: request.attempt.to_string(),
            },
        };

        debug!(
            run_id = %run_id,
            episode = %request.descriptor,
            is_retry = request.is_retry,
            "dispatching workflow"
        );

        let timer = crate::metrics::EXTERNAL_SERVICE_DURATION
            .with_label_values(&["workflow", "dispatch"])
            .start_timer();
        let response = self
            .client
            .post(&self.config.url)
            .header("authorization", format!("Bearer {}", self.config.token))
            .header("accept", "application/json")
            .json(&body)
            .send()
            .await;
        timer.observe_duration();
        let response = response.map_err(|e| {
            if e.is_timeout() {
                DispatchError::Timeout
            } else if e.is_connect() {
                DispatchError::ConnectionFailed(e.to_string())
            } else {
                DispatchError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        info!(run_id = %run_id, episode = %request.descriptor, "workflow dispatch accepted");
        Ok(DispatchReceipt { run_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_ids_are_unique() {
        let a = WorkflowDispatcher::new_run_id();
        let b = WorkflowDispatcher::new_run_id();
        assert!(a.starts_with("run_"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_dispatch_body_serializes_string_inputs() {
        let body = DispatchBody {
            git_ref: "main".to_string(),
            inputs: DispatchInputs {
                run_id: "run_abc".to_string(),
                main_category: "history".to_string(),
                sub_category: "ancient-rome".to_string(),
                episode: "3".to_string(),
                is_retry: "true".to_string(),
                attempt: "2".to_string(),
            },
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["ref"], "main");
        assert_eq!(json["inputs"]["episode"], "3");
        assert_eq!(json["inputs"]["is_retry"], "true");
    }

    #[test]
    fn test_config_defaults() {
        let config: WorkflowDispatcherConfig = serde_json::from_value(serde_json::json!({
            "url": "https://ci.example.com/dispatch",
            "token": "secret",
        }))
        .unwrap();
        assert_eq!(config.git_ref, "main");
        assert_eq!(config.timeout_secs, 30);
    }
}
