//! Metadata trait and types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Error type for metadata retrieval.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("metadata request timed out")]
    Timeout,

    #[error("metadata fetch failed: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("invalid metadata document: {0}")]
    Invalid(String),

    #[error("HTTP error: {0}")]
    Http(String),
}

/// Title, description and tags for one produced episode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EpisodeMetadata {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    /// Media host category hint, when the workflow supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Default for EpisodeMetadata {
    fn default() -> Self {
        Self {
            title: "Untitled".to_string(),
            description: String::new(),
            tags: Vec::new(),
            category: None,
        }
    }
}

/// Trait for metadata retrieval backends.
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    /// Fetch the metadata document published at the given URL.
    async fn fetch(&self, url: &str) -> Result<EpisodeMetadata, MetadataError>;
}
