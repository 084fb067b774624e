//! Mock uploader for testing.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::uploader::{UploadReceipt, UploadRequest, Uploader, UploaderError};

/// Mock implementation of the Uploader trait.
///
/// Records upload requests and answers with sequential artifact ids
/// plus a deterministic watch URL.
#[derive(Debug, Default)]
pub struct MockUploader {
    requests: Mutex<Vec<UploadRequest>>,
    counter: AtomicU32,
    failing: AtomicBool,
}

impl MockUploader {
    pub fn new() -> Self {
        Self::default()
    }

    /// All upload requests received so far, in order.
    pub fn requests(&self) -> Vec<UploadRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Make every upload fail.
    pub fn fail_all(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Uploader for MockUploader {
    async fn upload_unlisted(
        &self,
        request: &UploadRequest,
    ) -> Result<UploadReceipt, UploaderError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(UploaderError::Api {
                status: 500,
                message: "simulated upload failure".to_string(),
            });
        }

        self.requests.lock().unwrap().push(request.clone());
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let artifact_id = format!("vid_{n}");
        Ok(UploadReceipt {
            watch_url: Some(format!("https://watch.example.com/{artifact_id}")),
            artifact_id,
        })
    }
}
