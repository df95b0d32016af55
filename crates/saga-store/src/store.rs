use async_trait::async_trait;
use common::CorrelationId;

use crate::{InstanceRecord, Result, Version};

/// Options for saving a saga instance.
#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    /// Expected stored version for optimistic concurrency control.
    /// `Version::initial()` means the record must not exist yet.
    /// If None, no version check is performed (use with caution).
    pub expected_version: Option<Version>,
}

impl SaveOptions {
    /// Creates options with no version check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options expecting the record to be at a specific version.
    pub fn expect_version(version: Version) -> Self {
        Self {
            expected_version: Some(version),
        }
    }

    /// Creates options expecting the record to not exist (new instance).
    pub fn expect_new() -> Self {
        Self {
            expected_version: Some(Version::initial()),
        }
    }
}

/// Core trait for saga instance store implementations.
///
/// All implementations must be thread-safe (Send + Sync) and must
/// enforce the compare-and-swap contract: a `save` whose expected
/// version does not match the stored version fails with
/// `ConcurrencyConflict` and leaves the stored record untouched. The
/// caller then reloads and re-evaluates rather than overwriting.
#[async_trait]
pub trait SagaStore: Send + Sync {
    /// Loads the instance for `(workflow_type, correlation_id)`.
    ///
    /// Returns None if no instance exists.
    async fn load(
        &self,
        workflow_type: &str,
        correlation_id: CorrelationId,
    ) -> Result<Option<InstanceRecord>>;

    /// Saves an instance record atomically.
    ///
    /// The record carries the version it will have after this save; the
    /// expected version in `options` refers to the version currently
    /// stored (initial for a record that does not exist yet).
    ///
    /// Returns the saved version.
    async fn save(&self, record: InstanceRecord, options: SaveOptions) -> Result<Version>;
}

/// Extension trait providing convenience methods for saga stores.
#[async_trait]
pub trait SagaStoreExt: SagaStore {
    /// Checks whether an instance exists.
    async fn exists(&self, workflow_type: &str, correlation_id: CorrelationId) -> Result<bool> {
        Ok(self.load(workflow_type, correlation_id).await?.is_some())
    }

    /// Creates a new instance, failing if one already exists.
    async fn create(&self, record: InstanceRecord) -> Result<Version> {
        self.save(record, SaveOptions::expect_new()).await
    }
}

// Blanket implementation for all SagaStore implementations
impl<T: SagaStore + ?Sized> SagaStoreExt for T {}
