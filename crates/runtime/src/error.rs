//! Runtime error types.

use common::CorrelationId;
use saga_store::StoreError;
use thiserror::Error;

use crate::publisher::PublishError;

/// Infrastructure errors surfaced by the runtime.
///
/// Business outcome failures, duplicate/late events, and unroutable
/// events never show up here — they are absorbed into dispositions.
/// An `Err` means the current message could not be processed and
/// should be redelivered by the transport; the stored instance is
/// left at its last persisted state.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Store error other than a recoverable conflict.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Business data could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A command could not be handed to the transport. The transition
    /// is already persisted; redelivery will re-drive the dispatch.
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    /// The reload-and-retry loop lost every round of its conflict budget.
    #[error(
        "Gave up after {attempts} conflicting save attempts for {workflow_type}/{correlation_id}"
    )]
    ConflictRetriesExhausted {
        workflow_type: &'static str,
        correlation_id: CorrelationId,
        attempts: u32,
    },

    /// A stored record carries a state tag the definition doesn't declare.
    #[error("Corrupt state '{state}' stored for {workflow_type}/{correlation_id}")]
    CorruptState {
        workflow_type: &'static str,
        correlation_id: CorrelationId,
        state: String,
    },
}

/// Result type for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;
