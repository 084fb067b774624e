//! Media host publishing.
//!
//! Covers the two mutations the publish controllers need: flipping an
//! artifact's visibility and rewriting its description. Uploading new
//! media lives in [`crate::uploader`].

mod media_host;
mod types;

pub use media_host::{MediaHostConfig, MediaHostPublisher};
pub use types::{Publisher, PublisherError};
