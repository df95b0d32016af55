use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::CorrelationId;
use serde::{Deserialize, Serialize};

use crate::version::Version;

/// The persisted record of one in-flight workflow instance.
///
/// One record exists per `(workflow_type, correlation_id)` pair. The
/// business data payload is stored as JSON so the store stays agnostic
/// of the concrete workflow definition; the runtime owns the typed view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceRecord {
    /// Business key of the orchestrated request.
    pub correlation_id: CorrelationId,

    /// Tag of the workflow definition governing this instance.
    /// Fixed at creation, immutable afterwards.
    pub workflow_type: String,

    /// Current state tag. The only externally visible progress marker.
    pub current_state: String,

    /// Workflow-specific business data accumulated by transition mutations.
    pub data: serde_json::Value,

    /// Entered-at timestamp per state, recorded for audit only.
    /// Never read by transition logic.
    pub stage_timestamps: HashMap<String, DateTime<Utc>>,

    /// Consecutive step-executor failures reported for the current stage.
    pub retry_count: u32,

    /// Populated when the instance is abandoned to its failure state.
    pub failure_reason: Option<String>,

    /// Optimistic-concurrency token; increments with every save.
    pub version: Version,

    /// When the instance was created.
    pub created_at: DateTime<Utc>,

    /// When the instance was last saved.
    pub updated_at: DateTime<Utc>,
}

impl InstanceRecord {
    /// Creates a fresh record in the given initial state, at version 1.
    pub fn new(
        workflow_type: impl Into<String>,
        correlation_id: CorrelationId,
        initial_state: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        let now = Utc::now();
        let initial_state = initial_state.into();
        let mut stage_timestamps = HashMap::new();
        stage_timestamps.insert(initial_state.clone(), now);

        Self {
            correlation_id,
            workflow_type: workflow_type.into(),
            current_state: initial_state,
            data,
            stage_timestamps,
            retry_count: 0,
            failure_reason: None,
            version: Version::first(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Records entry into a new state: updates the state tag, stamps the
    /// audit timestamp, and resets the per-stage retry counter.
    pub fn enter_state(&mut self, state: impl Into<String>) {
        let state = state.into();
        let now = Utc::now();
        self.stage_timestamps.insert(state.clone(), now);
        self.current_state = state;
        self.retry_count = 0;
        self.updated_at = now;
    }

    /// Bumps the version in preparation for a compare-and-swap save.
    pub fn bump_version(&mut self) {
        self.version = self.version.next();
    }

    /// Returns the entered-at timestamp for a state, if recorded.
    pub fn entered_at(&self, state: &str) -> Option<DateTime<Utc>> {
        self.stage_timestamps.get(state).copied()
    }
}
