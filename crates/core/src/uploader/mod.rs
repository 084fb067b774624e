//! Media host uploads.
//!
//! Registers finished workflow output on the media host as an unlisted
//! item. Publishing (flipping to public) happens later through
//! [`crate::publisher`].

mod media_host;
mod types;

pub use media_host::MediaHostUploader;
pub use types::{UploadReceipt, UploadRequest, Uploader, UploaderError};
