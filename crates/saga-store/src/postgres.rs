use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::CorrelationId;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    InstanceRecord, Result, StoreError, Version,
    store::{SagaStore, SaveOptions},
};

/// PostgreSQL-backed saga instance store.
///
/// One row per `(workflow_type, correlation_id)`; updates are
/// version-checked so a stale writer loses with `ConcurrencyConflict`
/// instead of overwriting a fresher record.
#[derive(Clone)]
pub struct PostgresSagaStore {
    pool: PgPool,
}

impl PostgresSagaStore {
    /// Creates a new PostgreSQL saga store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_record(row: PgRow) -> Result<InstanceRecord> {
        let timestamps_json: serde_json::Value = row.try_get("stage_timestamps")?;
        let stage_timestamps: HashMap<String, DateTime<Utc>> =
            serde_json::from_value(timestamps_json)?;

        Ok(InstanceRecord {
            correlation_id: CorrelationId::from_uuid(row.try_get::<Uuid, _>("correlation_id")?),
            workflow_type: row.try_get("workflow_type")?,
            current_state: row.try_get("current_state")?,
            data: row.try_get("data")?,
            stage_timestamps,
            retry_count: row.try_get::<i32, _>("retry_count")? as u32,
            failure_reason: row.try_get("failure_reason")?,
            version: Version::new(row.try_get("version")?),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    async fn insert_new(&self, record: &InstanceRecord) -> Result<Version> {
        let timestamps_json = serde_json::to_value(&record.stage_timestamps)?;

        let result = sqlx::query(
            r#"
            INSERT INTO saga_instances
                (workflow_type, correlation_id, current_state, data, stage_timestamps,
                 retry_count, failure_reason, version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (workflow_type, correlation_id) DO NOTHING
            "#,
        )
        .bind(&record.workflow_type)
        .bind(record.correlation_id.as_uuid())
        .bind(&record.current_state)
        .bind(&record.data)
        .bind(timestamps_json)
        .bind(record.retry_count as i32)
        .bind(&record.failure_reason)
        .bind(record.version.as_i64())
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::warn!(
                workflow_type = %record.workflow_type,
                correlation_id = %record.correlation_id,
                "instance already exists, insert lost the race"
            );
            return Err(StoreError::AlreadyExists {
                workflow_type: record.workflow_type.clone(),
                correlation_id: record.correlation_id,
            });
        }

        tracing::debug!(
            workflow_type = %record.workflow_type,
            correlation_id = %record.correlation_id,
            state = %record.current_state,
            "instance created"
        );
        Ok(record.version)
    }

    async fn update_checked(&self, record: &InstanceRecord, expected: Version) -> Result<Version> {
        let timestamps_json = serde_json::to_value(&record.stage_timestamps)?;

        let result = sqlx::query(
            r#"
            UPDATE saga_instances
            SET current_state = $3, data = $4, stage_timestamps = $5,
                retry_count = $6, failure_reason = $7, version = $8, updated_at = $9
            WHERE workflow_type = $1 AND correlation_id = $2 AND version = $10
            "#,
        )
        .bind(&record.workflow_type)
        .bind(record.correlation_id.as_uuid())
        .bind(&record.current_state)
        .bind(&record.data)
        .bind(timestamps_json)
        .bind(record.retry_count as i32)
        .bind(&record.failure_reason)
        .bind(record.version.as_i64())
        .bind(record.updated_at)
        .bind(expected.as_i64())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let actual: Option<i64> = sqlx::query_scalar(
                "SELECT version FROM saga_instances WHERE workflow_type = $1 AND correlation_id = $2",
            )
            .bind(&record.workflow_type)
            .bind(record.correlation_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

            let actual = Version::new(actual.unwrap_or(0));
            tracing::warn!(
                workflow_type = %record.workflow_type,
                correlation_id = %record.correlation_id,
                expected = expected.as_i64(),
                actual = actual.as_i64(),
                "version check failed, stale writer rejected"
            );
            return Err(StoreError::ConcurrencyConflict {
                workflow_type: record.workflow_type.clone(),
                correlation_id: record.correlation_id,
                expected,
                actual,
            });
        }

        tracing::debug!(
            workflow_type = %record.workflow_type,
            correlation_id = %record.correlation_id,
            state = %record.current_state,
            version = record.version.as_i64(),
            "instance updated"
        );
        Ok(record.version)
    }

    async fn upsert_unchecked(&self, record: &InstanceRecord) -> Result<Version> {
        let timestamps_json = serde_json::to_value(&record.stage_timestamps)?;

        sqlx::query(
            r#"
            INSERT INTO saga_instances
                (workflow_type, correlation_id, current_state, data, stage_timestamps,
                 retry_count, failure_reason, version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (workflow_type, correlation_id) DO UPDATE
            SET current_state = EXCLUDED.current_state,
                data = EXCLUDED.data,
                stage_timestamps = EXCLUDED.stage_timestamps,
                retry_count = EXCLUDED.retry_count,
                failure_reason = EXCLUDED.failure_reason,
                version = EXCLUDED.version,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&record.workflow_type)
        .bind(record.correlation_id.as_uuid())
        .bind(&record.current_state)
        .bind(&record.data)
        .bind(timestamps_json)
        .bind(record.retry_count as i32)
        .bind(&record.failure_reason)
        .bind(record.version.as_i64())
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(record.version)
    }
}

#[async_trait]
impl SagaStore for PostgresSagaStore {
    async fn load(
        &self,
        workflow_type: &str,
        correlation_id: CorrelationId,
    ) -> Result<Option<InstanceRecord>> {
        let row = sqlx::query(
            "SELECT * FROM saga_instances WHERE workflow_type = $1 AND correlation_id = $2",
        )
        .bind(workflow_type)
        .bind(correlation_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_record).transpose()
    }

    async fn save(&self, record: InstanceRecord, options: SaveOptions) -> Result<Version> {
        match options.expected_version {
            Some(expected) if expected == Version::initial() => self.insert_new(&record).await,
            Some(expected) => self.update_checked(&record, expected).await,
            None => self.upsert_unchecked(&record).await,
        }
    }
}
