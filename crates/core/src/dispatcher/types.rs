//! Dispatch trait and types.

use async_trait::async_trait;

use crate::episode::EpisodeDescriptor;

/// Error type for dispatch operations.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("dispatch request timed out")]
    Timeout,

    #[error("could not reach workflow runner: {0}")]
    ConnectionFailed(String),

    #[error("workflow runner rejected dispatch: {status} - {message}")]
    Rejected { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(String),
}

/// A request to produce one episode.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRequest {
    /// The episode to produce.
    pub descriptor: EpisodeDescriptor,
    /// Whether this is a backup retry of an earlier failed attempt.
    pub is_retry: bool,
    /// 1-based attempt number for this episode's production day.
    pub attempt: u32,
}

impl DispatchRequest {
    /// A first-attempt request for the given episode.
    pub fn new(descriptor: EpisodeDescriptor) -> Self {
        Self {
            descriptor,
            is_retry: false,
            attempt: 1,
        }
    }

    /// Mark this request as a backup retry with the given attempt number.
    pub fn retry(mut self, attempt: u32) -> Self {
        self.is_retry = true;
        self.attempt = attempt;
        self
    }
}

/// Confirmation that the workflow runner accepted a dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchReceipt {
    /// Correlation id passed to the workflow; progress notifications
    /// echo it back.
    pub run_id: String,
}

/// Trait for workflow dispatch backends.
#[async_trait]
pub trait JobDispatcher: Send + Sync {
    /// Backend name for logging (e.g. "workflow-http").
    fn backend_name(&self) -> &str;

    /// Ask the backend to start producing the requested episode.
    ///
    /// Returns once the backend has accepted the job; production runs
    /// asynchronously and reports back through webhooks.
    async fn dispatch(&self, request: &DispatchRequest) -> Result<DispatchReceipt, DispatchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_request_defaults_to_first_attempt() {
        let request = DispatchRequest::new(EpisodeDescriptor::new("history", "ancient-rome", 1));
        assert!(!request.is_retry);
        assert_eq!(request.attempt, 1);
    }

    #[test]
    fn test_retry_sets_flag_and_attempt() {
        let request = DispatchRequest::new(EpisodeDescriptor::new("history", "ancient-rome", 1))
            .retry(2);
        assert!(request.is_retry);
        assert_eq!(request.attempt, 2);
    }
}
