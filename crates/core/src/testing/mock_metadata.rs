//! Mock metadata fetcher for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::metadata::{EpisodeMetadata, MetadataError, MetadataFetcher};

/// Mock implementation of the MetadataFetcher trait.
///
/// Serves documents registered per URL; unregistered URLs answer 404.
#[derive(Debug, Default)]
pub struct MockMetadataFetcher {
    documents: Mutex<HashMap<String, EpisodeMetadata>>,
    failing: AtomicBool,
}

impl MockMetadataFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the metadata served for a URL.
    pub fn set(&self, url: impl Into<String>, metadata: EpisodeMetadata) {
        self.documents.lock().unwrap().insert(url.into(), metadata);
    }

    /// Make every fetch fail.
    pub fn fail_all(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl MetadataFetcher for MockMetadataFetcher {
    async fn fetch(&self, url: &str) -> Result<EpisodeMetadata, MetadataError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MetadataError::Api {
                status: 500,
                message: "simulated metadata failure".to_string(),
            });
        }
        self.documents
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| MetadataError::Api {
                status: 404,
                message: format!("no document registered for {url}"),
            })
    }
}
