//! HTTP metadata fetcher.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{EpisodeMetadata, MetadataError, MetadataFetcher};

/// Fetches the workflow's metadata document over HTTP.
pub struct HttpMetadataFetcher {
    client: reqwest::Client,
}

// Wire format of the document the workflow publishes. Every field is
// optional; older workflow versions omit some of them.
#[derive(Debug, Deserialize)]
struct MetadataDocument {
    #[serde(default)]
    metadata: MetadataFields,
}

#[derive(Debug, Default, Deserialize)]
struct MetadataFields {
    #[serde(default)]
    final_title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    category: Option<String>,
}

impl HttpMetadataFetcher {
    pub fn new(timeout_secs: u64) -> Result<Self, MetadataError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| MetadataError::Http(e.to_string()))?;
        Ok(Self { client })
    }

    fn from_document(document: MetadataDocument) -> EpisodeMetadata {
        let defaults = EpisodeMetadata::default();
        EpisodeMetadata {
            title: document
                .metadata
                .final_title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or(defaults.title),
            description: document.metadata.description.unwrap_or(defaults.description),
            tags: document.metadata.tags.unwrap_or(defaults.tags),
            category: document.metadata.category,
        }
    }
}

#[async_trait]
impl MetadataFetcher for HttpMetadataFetcher {
    async fn fetch(&self, url: &str) -> Result<EpisodeMetadata, MetadataError> {
        debug!(url = %url, "fetching episode metadata");

        let timer = crate::metrics::EXTERNAL_SERVICE_DURATION
            .with_label_values(&["metadata", "fetch"])
            .start_timer();
        let response = self.client.get(url).send().await;
        timer.observe_duration();
        let response = response.map_err(|e| {
            if e.is_timeout() {
                MetadataError::Timeout
            } else {
                MetadataError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MetadataError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let document: MetadataDocument = response
            .json()
            .await
            .map_err(|e| MetadataError::Invalid(e.to_string()))?;

        Ok(Self::from_document(document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_document_maps_fields() {
        let document: MetadataDocument = serde_json::from_str(
            r#"{
                "metadata": {
                    "final_title": "Ancient Rome, part 3",
                    "description": "A deep dive.",
                    "tags": ["history", "rome"],
                    "category": "27"
                }
            }"#,
        )
        .unwrap();

        let metadata = HttpMetadataFetcher::from_document(document);
        assert_eq!(metadata.title, "Ancient Rome, part 3");
        assert_eq!(metadata.tags.len(), 2);
        assert_eq!(metadata.category.as_deref(), Some("27"));
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let document: MetadataDocument = serde_json::from_str(r#"{}"#).unwrap();
        let metadata = HttpMetadataFetcher::from_document(document);
        assert_eq!(metadata, EpisodeMetadata::default());
    }

    #[test]
    fn test_blank_title_falls_back_to_placeholder() {
        let document: MetadataDocument =
            serde_json::from_str(r#"{"metadata": {"final_title": "  "}}"#).unwrap();
        let metadata = HttpMetadataFetcher::from_document(document);
        assert_eq!(metadata.title, "Untitled");
    }
}
