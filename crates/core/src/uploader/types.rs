//! Uploader trait and types.

use async_trait::async_trait;

use crate::metadata::EpisodeMetadata;
use crate::store::ArtifactKind;

/// Error type for upload operations.
#[derive(Debug, thiserror::Error)]
pub enum UploaderError {
    #[error("upload request timed out")]
    Timeout,

    #[error("media host error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("invalid upload response: {0}")]
    InvalidResponse(String),

    #[error("HTTP error: {0}")]
    Http(String),
}

/// A request to register finished media on the media host.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    /// URL the media host pulls the media file from.
    pub media_url: String,
    /// Optional thumbnail to attach.
    pub thumbnail_url: Option<String>,
    /// Title, description and tags for the item.
    pub metadata: EpisodeMetadata,
    /// Which publish track the item belongs to.
    pub kind: ArtifactKind,
}

/// Confirmation of a completed upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadReceipt {
    /// Media host identifier for the uploaded item.
    pub artifact_id: String,
    /// Direct watch URL, when the host returns one.
    pub watch_url: Option<String>,
}

/// Trait for media host upload backends.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Upload the media as an unlisted item and return its identifier.
    async fn upload_unlisted(&self, request: &UploadRequest) -> Result<UploadReceipt, UploaderError>;
}
