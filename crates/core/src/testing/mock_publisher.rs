//! Mock publisher for testing.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::publisher::{Publisher, PublisherError};
use crate::store::Visibility;

/// Mock implementation of the Publisher trait.
///
/// Records visibility and description calls. Specific artifact ids
/// can be marked to fail their visibility flip.
#[derive(Debug, Default)]
pub struct MockPublisher {
    visibility_calls: Mutex<Vec<(String, Visibility)>>,
    description_calls: Mutex<Vec<(String, String)>>,
    failing_ids: Mutex<HashSet<String>>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// All visibility changes requested so far, in order.
    pub fn visibility_calls(&self) -> Vec<(String, Visibility)> {
        self.visibility_calls.lock().unwrap().clone()
    }

    /// All description updates requested so far, in order.
    pub fn description_calls(&self) -> Vec<(String, String)> {
        self.description_calls.lock().unwrap().clone()
    }

    /// Make visibility flips fail for the given artifact id.
    pub fn fail_visibility_for(&self, artifact_id: impl Into<String>) {
        self.failing_ids.lock().unwrap().insert(artifact_id.into());
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn set_visibility(
        &self,
        artifact_id: &str,
        visibility: Visibility,
    ) -> Result<(), PublisherError> {
        if self.failing_ids.lock().unwrap().contains(artifact_id) {
            return Err(PublisherError::Api {
                status: 500,
                message: format!("simulated failure for {artifact_id}"),
            });
        }
        self.visibility_calls
            .lock()
            .unwrap()
            .push((artifact_id.to_string(), visibility));
        Ok(())
    }

    async fn set_description(
        &self,
        artifact_id: &str,
        description: &str,
    ) -> Result<(), PublisherError> {
        self.description_calls
            .lock()
            .unwrap()
            .push((artifact_id.to_string(), description.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_calls() {
        let publisher = MockPublisher::new();
        publisher
            .set_visibility("vid_1", Visibility::Public)
            .await
            .unwrap();
        publisher.set_description("vid_1", "hello").await.unwrap();

        assert_eq!(
            publisher.visibility_calls(),
            vec![("vid_1".to_string(), Visibility::Public)]
        );
        assert_eq!(
            publisher.description_calls(),
            vec![("vid_1".to_string(), "hello".to_string())]
        );
    }

    #[tokio::test]
    async fn test_targeted_failure() {
        let publisher = MockPublisher::new();
        publisher.fail_visibility_for("vid_bad");

        assert!(publisher
            .set_visibility("vid_bad", Visibility::Public)
            .await
            .is_err());
        assert!(publisher
            .set_visibility("vid_good", Visibility::Public)
            .await
            .is_ok());
        assert_eq!(publisher.visibility_calls().len(), 1);
    }
}
