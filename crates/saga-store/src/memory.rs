use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::CorrelationId;
use tokio::sync::RwLock;

use crate::{
    InstanceRecord, Result, StoreError, Version,
    store::{SagaStore, SaveOptions},
};

/// In-memory saga instance store for testing.
///
/// Provides the same optimistic-concurrency semantics as the
/// PostgreSQL implementation, keyed by `(workflow_type, correlation_id)`.
#[derive(Clone, Default)]
pub struct InMemorySagaStore {
    instances: Arc<RwLock<HashMap<(String, CorrelationId), InstanceRecord>>>,
}

impl InMemorySagaStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of instances stored.
    pub async fn instance_count(&self) -> usize {
        self.instances.read().await.len()
    }

    /// Clears all instances.
    pub async fn clear(&self) {
        self.instances.write().await.clear();
    }
}

#[async_trait]
impl SagaStore for InMemorySagaStore {
    async fn load(
        &self,
        workflow_type: &str,
        correlation_id: CorrelationId,
    ) -> Result<Option<InstanceRecord>> {
        let instances = self.instances.read().await;
        Ok(instances
            .get(&(workflow_type.to_string(), correlation_id))
            .cloned())
    }

    async fn save(&self, record: InstanceRecord, options: SaveOptions) -> Result<Version> {
        let key = (record.workflow_type.clone(), record.correlation_id);
        let mut instances = self.instances.write().await;

        let stored_version = instances
            .get(&key)
            .map(|r| r.version)
            .unwrap_or(Version::initial());

        if let Some(expected) = options.expected_version {
            if expected == Version::initial() && stored_version != Version::initial() {
                return Err(StoreError::AlreadyExists {
                    workflow_type: key.0,
                    correlation_id: key.1,
                });
            }
            if stored_version != expected {
                return Err(StoreError::ConcurrencyConflict {
                    workflow_type: key.0,
                    correlation_id: key.1,
                    expected,
                    actual: stored_version,
                });
            }
        }

        let saved_version = record.version;
        instances.insert(key, record);
        Ok(saved_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SagaStoreExt;

    fn make_record(correlation_id: CorrelationId) -> InstanceRecord {
        InstanceRecord::new(
            "CourseEnrollment",
            correlation_id,
            "Initiated",
            serde_json::json!({}),
        )
    }

    #[tokio::test]
    async fn test_create_and_load() {
        let store = InMemorySagaStore::new();
        let correlation_id = CorrelationId::new();

        store.create(make_record(correlation_id)).await.unwrap();

        let loaded = store
            .load("CourseEnrollment", correlation_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.correlation_id, correlation_id);
        assert_eq!(loaded.current_state, "Initiated");
        assert_eq!(loaded.version, Version::first());
    }

    #[tokio::test]
    async fn test_load_missing_returns_none() {
        let store = InMemorySagaStore::new();
        let loaded = store
            .load("CourseEnrollment", CorrelationId::new())
            .await
            .unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_workflow_type_scopes_instances() {
        let store = InMemorySagaStore::new();
        let correlation_id = CorrelationId::new();
        store.create(make_record(correlation_id)).await.unwrap();

        let other = store
            .load("MentoringSession", correlation_id)
            .await
            .unwrap();
        assert!(other.is_none());
    }

    #[tokio::test]
    async fn test_create_twice_is_rejected() {
        let store = InMemorySagaStore::new();
        let correlation_id = CorrelationId::new();
        store.create(make_record(correlation_id)).await.unwrap();

        let err = store.create(make_record(correlation_id)).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_compare_and_swap_update() {
        let store = InMemorySagaStore::new();
        let correlation_id = CorrelationId::new();
        store.create(make_record(correlation_id)).await.unwrap();

        let mut record = store
            .load("CourseEnrollment", correlation_id)
            .await
            .unwrap()
            .unwrap();
        let loaded_version = record.version;
        record.enter_state("CheckingCapacity");
        record.bump_version();

        let saved = store
            .save(record, SaveOptions::expect_version(loaded_version))
            .await
            .unwrap();
        assert_eq!(saved, loaded_version.next());
    }

    #[tokio::test]
    async fn test_stale_writer_gets_conflict() {
        let store = InMemorySagaStore::new();
        let correlation_id = CorrelationId::new();
        store.create(make_record(correlation_id)).await.unwrap();

        // Two writers load the same version
        let mut first = store
            .load("CourseEnrollment", correlation_id)
            .await
            .unwrap()
            .unwrap();
        let mut second = first.clone();
        let loaded_version = first.version;

        first.enter_state("CheckingCapacity");
        first.bump_version();
        store
            .save(first, SaveOptions::expect_version(loaded_version))
            .await
            .unwrap();

        second.enter_state("EnrollmentFailed");
        second.bump_version();
        let err = store
            .save(second, SaveOptions::expect_version(loaded_version))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ConcurrencyConflict { .. }));

        // The losing write must not have clobbered the winner
        let stored = store
            .load("CourseEnrollment", correlation_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.current_state, "CheckingCapacity");
    }

    #[tokio::test]
    async fn test_save_without_version_check() {
        let store = InMemorySagaStore::new();
        let correlation_id = CorrelationId::new();
        store.create(make_record(correlation_id)).await.unwrap();

        let mut record = store
            .load("CourseEnrollment", correlation_id)
            .await
            .unwrap()
            .unwrap();
        record.enter_state("CheckingCapacity");
        record.bump_version();

        store.save(record, SaveOptions::new()).await.unwrap();
        assert_eq!(store.instance_count().await, 1);
    }
}
