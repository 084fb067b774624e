//! Testing utilities and mock implementations.
//!
//! Mock implementations of the four external adapter traits, plus a
//! small category tree fixture, for unit and end-to-end tests without
//! real infrastructure.
//!
//! # Example
//!
//! ```rust,ignore
//! use showrunner_core::testing::{test_tree, MockDispatcher, MockPublisher};
//!
//! let dispatcher = MockDispatcher::new();
//! dispatcher.fail_with("runner unreachable");
//! // ... exercise a controller, then assert on dispatcher.requests()
//! ```

mod mock_dispatcher;
mod mock_metadata;
mod mock_publisher;
mod mock_uploader;

pub use mock_dispatcher::MockDispatcher;
pub use mock_metadata::MockMetadataFetcher;
pub use mock_publisher::MockPublisher;
pub use mock_uploader::MockUploader;

use crate::episode::{CategoryGroup, CategoryTree};

/// A small two-group category tree used across tests.
///
/// Full cycle, in order: (history, ancient-rome), (history, medieval),
/// (science, space).
pub fn test_tree() -> CategoryTree {
    CategoryTree::new(vec![
        CategoryGroup {
            name: "history".to_string(),
            sub_categories: vec!["ancient-rome".to_string(), "medieval".to_string()],
        },
        CategoryGroup {
            name: "science".to_string(),
            sub_categories: vec!["space".to_string()],
        },
    ])
    .expect("fixture tree is valid")
}
