//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p saga-store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use saga_store::{
    CorrelationId, InstanceRecord, PostgresSagaStore, SagaStore, SaveOptions, StoreError, Version,
};
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for migrations
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_saga_instances.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresSagaStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE saga_instances")
        .execute(&pool)
        .await
        .unwrap();

    PostgresSagaStore::new(pool)
}

fn make_record(correlation_id: CorrelationId) -> InstanceRecord {
    InstanceRecord::new(
        "CourseEnrollment",
        correlation_id,
        "Initiated",
        serde_json::json!({"learner_id": "L-1", "course_id": "C-1"}),
    )
}

#[tokio::test]
async fn test_create_and_load_roundtrip() {
    let store = get_test_store().await;
    let correlation_id = CorrelationId::new();

    store
        .save(make_record(correlation_id), SaveOptions::expect_new())
        .await
        .unwrap();

    let loaded = store
        .load("CourseEnrollment", correlation_id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(loaded.correlation_id, correlation_id);
    assert_eq!(loaded.workflow_type, "CourseEnrollment");
    assert_eq!(loaded.current_state, "Initiated");
    assert_eq!(loaded.version, Version::first());
    assert_eq!(loaded.data["learner_id"], "L-1");
    assert!(loaded.entered_at("Initiated").is_some());
}

#[tokio::test]
async fn test_load_missing_returns_none() {
    let store = get_test_store().await;

    let loaded = store
        .load("CourseEnrollment", CorrelationId::new())
        .await
        .unwrap();
    assert!(loaded.is_none());
}

#[tokio::test]
async fn test_workflow_type_scopes_instances() {
    let store = get_test_store().await;
    let correlation_id = CorrelationId::new();

    store
        .save(make_record(correlation_id), SaveOptions::expect_new())
        .await
        .unwrap();

    let other = store
        .load("MentoringSession", correlation_id)
        .await
        .unwrap();
    assert!(other.is_none());
}

#[tokio::test]
async fn test_duplicate_create_is_rejected() {
    let store = get_test_store().await;
    let correlation_id = CorrelationId::new();

    store
        .save(make_record(correlation_id), SaveOptions::expect_new())
        .await
        .unwrap();

    let err = store
        .save(make_record(correlation_id), SaveOptions::expect_new())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists { .. }));
}

#[tokio::test]
async fn test_compare_and_swap_update() {
    let store = get_test_store().await;
    let correlation_id = CorrelationId::new();

    store
        .save(make_record(correlation_id), SaveOptions::expect_new())
        .await
        .unwrap();

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

    let loaded = store
        .load("CourseEnrollment", correlation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.current_state, "CheckingCapacity");
    assert!(loaded.entered_at("Initiated").is_some());
    assert!(loaded.entered_at("CheckingCapacity").is_some());
}

#[tokio::test]
async fn test_stale_writer_gets_conflict() {
    let store = get_test_store().await;
    let correlation_id = CorrelationId::new();

    store
        .save(make_record(correlation_id), SaveOptions::expect_new())
        .await
        .unwrap();

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

    match err {
        StoreError::ConcurrencyConflict {
            expected, actual, ..
        } => {
            assert_eq!(expected, loaded_version);
            assert_eq!(actual, loaded_version.next());
        }
        other => panic!("expected ConcurrencyConflict, got {other}"),
    }

    // The winner's state must be intact
    let stored = store
        .load("CourseEnrollment", correlation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.current_state, "CheckingCapacity");
}

#[tokio::test]
async fn test_retry_and_failure_fields_roundtrip() {
    let store = get_test_store().await;
    let correlation_id = CorrelationId::new();

    let mut record = make_record(correlation_id);
    record.retry_count = 2;
    record.failure_reason = Some("capacity service timed out".to_string());

    store
        .save(record, SaveOptions::expect_new())
        .await
        .unwrap();

    let loaded = store
        .load("CourseEnrollment", correlation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.retry_count, 2);
    assert_eq!(
        loaded.failure_reason.as_deref(),
        Some("capacity service timed out")
    );
}

#[tokio::test]
async fn test_unchecked_save_upserts() {
    let store = get_test_store().await;
    let correlation_id = CorrelationId::new();

    store
        .save(make_record(correlation_id), SaveOptions::new())
        .await
        .unwrap();

    let mut record = store
        .load("CourseEnrollment", correlation_id)
        .await
        .unwrap()
        .unwrap();
    record.enter_state("CheckingCapacity");
    record.bump_version();

    store.save(record, SaveOptions::new()).await.unwrap();

    let loaded = store
        .load("CourseEnrollment", correlation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.current_state, "CheckingCapacity");
    assert_eq!(loaded.version, Version::first().next());
}
