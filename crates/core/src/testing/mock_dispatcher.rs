//! Mock job dispatcher for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::dispatcher::{DispatchError, DispatchReceipt, DispatchRequest, JobDispatcher};

/// Mock implementation of the JobDispatcher trait.
///
/// Records every dispatch request and hands out sequential run ids.
/// A failure message can be armed to make all dispatches fail until
/// cleared.
#[derive(Debug, Default)]
pub struct MockDispatcher {
    requests: Mutex<Vec<DispatchRequest>>,
    failure: Mutex<Option<String>>,
    counter: AtomicU32,
}

impl MockDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// All requests dispatched so far, in order.
    pub fn requests(&self) -> Vec<DispatchRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Make every dispatch fail with a connection error.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock().unwrap() = Some(message.into());
    }

    /// Let dispatches succeed again.
    pub fn clear_failure(&self) {
        *self.failure.lock().unwrap() = None;
    }
}

#[async_trait]
impl JobDispatcher for MockDispatcher {
    fn backend_name(&self) -> &str {
        "mock"
    }

    async fn dispatch(&self, request: &DispatchRequest) -> Result<DispatchReceipt, DispatchError> {
        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(DispatchError::ConnectionFailed(message));
        }

        self.requests.lock().unwrap().push(request.clone());
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(DispatchReceipt {
            run_id: format!("mock_run_{n}"),
        })
    }
}
