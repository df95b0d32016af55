//! State-machine runtime for the mentoring platform orchestration core.
//!
//! The runtime receives correlated events, routes each one to its saga
//! instance (creating one for initiating events), evaluates the
//! workflow's transition table, persists the new state under an
//! optimistic-concurrency discipline, and only then publishes the
//! transition's commands to the step-executors.
//!
//! Late, duplicate, and unroutable events are absorbed as logged
//! no-ops; that is the designed behavior under at-least-once delivery,
//! not an error path.

pub mod config;
pub mod error;
pub mod publisher;
pub mod runtime;

pub use config::RuntimeConfig;
pub use error::{Result, RuntimeError};
pub use publisher::{CommandPublisher, InMemoryPublisher, PublishError};
pub use runtime::{Disposition, IgnoreReason, WorkflowRuntime};
