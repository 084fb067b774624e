//! HTTP media host publisher.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::store::Visibility;

use super::{Publisher, PublisherError};

fn default_timeout_secs() -> u64 {
    30
}

/// Configuration shared by the media host publisher and uploader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaHostConfig {
    /// Base URL of the media host API.
    pub api_base: String,
    /// API token.
    pub api_token: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Publishes via the media host's REST API.
pub struct MediaHostPublisher {
    client: reqwest::Client,
    config: MediaHostConfig,
}

#[derive(Debug, Serialize)]
struct VisibilityBody<'a> {
    visibility: &'a str,
}

#[derive(Debug, Serialize)]
struct DescriptionBody<'a> {
    description: &'a str,
}

impl MediaHostPublisher {
    pub fn new(config: MediaHostConfig) -> Result<Self, PublisherError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PublisherError::Http(e.to_string()))?;
        Ok(Self { client, config })
    }

    async fn patch_media(
        &self,
        artifact_id: &str,
        body: &impl Serialize,
    ) -> Result<(), PublisherError> {
        let timer = crate::metrics::EXTERNAL_SERVICE_DURATION
            .with_label_values(&["media_host", "patch_media"])
            .start_timer();
        let response = self
            .client
            .patch(format!("{}/media/{artifact_id}", self.config.api_base))
            .header(
                "authorization",
                format!("Bearer {}", self.config.api_token),
            )
            .json(body)
            .send()
            .await;
        timer.observe_duration();
        let response = response.map_err(|e| {
            if e.is_timeout() {
                PublisherError::Timeout
            } else {
                PublisherError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(PublisherError::NotFound(artifact_id.to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PublisherError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Publisher for MediaHostPublisher {
    async fn set_visibility(
        &self,
        artifact_id: &str,
        visibility: Visibility,
    ) -> Result<(), PublisherError> {
        self.patch_media(
            artifact_id,
            &VisibilityBody {
                visibility: visibility.as_str(),
            },
        )
        .await?;
        info!(artifact_id = %artifact_id, visibility = visibility.as_str(), "visibility updated");
        Ok(())
    }

    async fn set_description(
        &self,
        artifact_id: &str,
        description: &str,
    ) -> Result<(), PublisherError> {
        self.patch_media(artifact_id, &DescriptionBody { description })
            .await?;
        info!(artifact_id = %artifact_id, "description updated");
        Ok(())
    }
}
