//! Workflow dispatch.
//!
//! The orchestrator hands an episode descriptor to a [`JobDispatcher`],
//! which asks an external workflow runner to produce that episode. The
//! production implementation talks to a CI-style dispatch endpoint over
//! HTTP; tests swap in a mock.

mod types;
mod workflow;

pub use types::{DispatchError, DispatchReceipt, DispatchRequest, JobDispatcher};
pub use workflow::{WorkflowDispatcher, WorkflowDispatcherConfig};
