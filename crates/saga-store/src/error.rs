use thiserror::Error;

use common::CorrelationId;

use crate::version::Version;

/// Errors that can occur when interacting with the saga instance store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A concurrency conflict occurred when saving an instance.
    /// The expected version did not match the stored version.
    #[error(
        "Concurrency conflict for {workflow_type}/{correlation_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        workflow_type: String,
        correlation_id: CorrelationId,
        expected: Version,
        actual: Version,
    },

    /// An instance already exists where a new one was being created.
    #[error("Instance already exists: {workflow_type}/{correlation_id}")]
    AlreadyExists {
        workflow_type: String,
        correlation_id: CorrelationId,
    },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Returns true if the error is a recoverable concurrency conflict
    /// (the caller should reload and re-evaluate).
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            StoreError::ConcurrencyConflict { .. } | StoreError::AlreadyExists { .. }
        )
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
