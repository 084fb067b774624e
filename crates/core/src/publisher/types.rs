//! Publisher trait.

use async_trait::async_trait;

use crate::store::Visibility;

/// Error type for publish operations.
#[derive(Debug, thiserror::Error)]
pub enum PublisherError {
    #[error("artifact not found on media host: {0}")]
    NotFound(String),

    #[error("media host request timed out")]
    Timeout,

    #[error("media host error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(String),
}

/// Trait for media host publishing backends.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Set the visibility of an already uploaded artifact.
    async fn set_visibility(
        &self,
        artifact_id: &str,
        visibility: Visibility,
    ) -> Result<(), PublisherError>;

    /// Replace the description of an already uploaded artifact.
    async fn set_description(
        &self,
        artifact_id: &str,
        description: &str,
    ) -> Result<(), PublisherError>;
}
