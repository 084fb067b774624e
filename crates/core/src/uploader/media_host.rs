//! HTTP media host uploader.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::publisher::MediaHostConfig;
use crate::store::Visibility;

use super::{UploadReceipt, UploadRequest, Uploader, UploaderError};

/// Uploads via the media host's REST API.
///
/// The host pulls the media from the given URL itself, so the upload
/// call carries only URLs and metadata, never file bytes.
pub struct MediaHostUploader {
    client: reqwest::Client,
    config: MediaHostConfig,
}

#[derive(Debug, Serialize)]
struct UploadBody<'a> {
    media_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    thumbnail_url: Option<&'a str>,
    title: &'a str,
    description: &'a str,
    tags: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
    visibility: &'a str,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    id: String,
    #[serde(default)]
    watch_url: Option<String>,
}

impl MediaHostUploader {
    pub fn new(config: MediaHostConfig) -> Result<Self, UploaderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| UploaderError::Http(e.to_string()))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Uploader for MediaHostUploader {
    async fn upload_unlisted(
        &self,
        request: &UploadRequest,
    ) -> Result<UploadReceipt, UploaderError> {
        let body = UploadBody {
            media_url: &request.media_url,
            thumbnail_url: request.thumbnail_url.as_deref(),
            title: &request.metadata.title,
            description: &request.metadata.description,
            tags: &request.metadata.tags,
            category: request.metadata.category.as_deref(),
            visibility: Visibility::Unlisted.as_str(),
        };

        let timer = crate::metrics::EXTERNAL_SERVICE_DURATION
            .with_label_values(&["media_host", "upload"])
            .start_timer();
        let response = self
            .client
            .post(format!("{}/media", self.config.api_base))
            .header(
                "authorization",
                format!("Bearer {}", self.config.api_token),
            )
            .json(&body)
            .send()
            .await;
        timer.observe_duration();
        let response = response.map_err(|e| {
            if e.is_timeout() {
                UploaderError::Timeout
            } else {
                UploaderError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(UploaderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|e| UploaderError::InvalidResponse(e.to_string()))?;

        info!(
            artifact_id = %parsed.id,
            kind = %request.kind,
            title = %request.metadata.title,
            "uploaded unlisted media"
        );

        Ok(UploadReceipt {
            artifact_id: parsed.id,
            watch_url: parsed.watch_url,
        })
    }
}
