//! Mentoring-session events.

use common::CorrelationId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::machine::{StepFailure, WorkflowEvent};

/// Events that drive the mentoring-session workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SessionEvent {
    /// A mentoring session was requested.
    SessionCreated(SessionCreatedData),

    /// The schedule executor finished validating the proposed slot.
    ScheduleValidated(ScheduleValidatedData),

    /// Participant notifications were delivered.
    NotificationsSent(NotificationsSentData),

    /// The session took place.
    CompletionRequested(CompletionRequestedData),

    /// A participant cancelled the session.
    CancellationRequested(CancellationRequestedData),

    /// A step-executor failed while driving a stage.
    StepExecutionFailed(StepFailure),
}

/// Data for the SessionCreated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCreatedData {
    /// The session id (correlation key).
    pub session_id: CorrelationId,
    /// The mentor.
    pub mentor_id: Uuid,
    /// The mentee.
    pub mentee_id: Uuid,
    /// The proposed schedule slot.
    pub schedule_id: Uuid,
}

/// Data for the ScheduleValidated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleValidatedData {
    /// The session id.
    pub session_id: CorrelationId,
    /// Business outcome: whether the slot is valid for both parties.
    pub is_valid: bool,
}

/// Data for the NotificationsSent event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsSentData {
    /// The session id.
    pub session_id: CorrelationId,
}

/// Data for the CompletionRequested event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequestedData {
    /// The session id.
    pub session_id: CorrelationId,
}

/// Data for the CancellationRequested event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancellationRequestedData {
    /// The session id.
    pub session_id: CorrelationId,
    /// Why the session was cancelled.
    pub reason: Option<String>,
}

impl WorkflowEvent for SessionEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::SessionCreated(_) => "SessionCreated",
            SessionEvent::ScheduleValidated(_) => "ScheduleValidated",
            SessionEvent::NotificationsSent(_) => "NotificationsSent",
            SessionEvent::CompletionRequested(_) => "CompletionRequested",
            SessionEvent::CancellationRequested(_) => "CancellationRequested",
            SessionEvent::StepExecutionFailed(_) => "StepExecutionFailed",
        }
    }

    fn correlation_id(&self) -> CorrelationId {
        match self {
            SessionEvent::SessionCreated(data) => data.session_id,
            SessionEvent::ScheduleValidated(data) => data.session_id,
            SessionEvent::NotificationsSent(data) => data.session_id,
            SessionEvent::CompletionRequested(data) => data.session_id,
            SessionEvent::CancellationRequested(data) => data.session_id,
            SessionEvent::StepExecutionFailed(failure) => failure.correlation_id,
        }
    }

    fn is_initiating(&self) -> bool {
        matches!(self, SessionEvent::SessionCreated(_))
    }

    fn executor_failure(&self) -> Option<(&str, &str)> {
        match self {
            SessionEvent::StepExecutionFailed(failure) => {
                Some((failure.stage.as_str(), failure.reason.as_str()))
            }
            _ => None,
        }
    }
}

// Convenience constructors
impl SessionEvent {
    /// Creates a SessionCreated event.
    pub fn session_created(
        session_id: CorrelationId,
        mentor_id: Uuid,
        mentee_id: Uuid,
        schedule_id: Uuid,
    ) -> Self {
        SessionEvent::SessionCreated(SessionCreatedData {
            session_id,
            mentor_id,
            mentee_id,
            schedule_id,
        })
    }

    /// Creates a ScheduleValidated event.
    pub fn schedule_validated(session_id: CorrelationId, is_valid: bool) -> Self {
        SessionEvent::ScheduleValidated(ScheduleValidatedData {
            session_id,
            is_valid,
        })
    }

    /// Creates a NotificationsSent event.
    pub fn notifications_sent(session_id: CorrelationId) -> Self {
        SessionEvent::NotificationsSent(NotificationsSentData { session_id })
    }

    /// Creates a CompletionRequested event.
    pub fn completion_requested(session_id: CorrelationId) -> Self {
        SessionEvent::CompletionRequested(CompletionRequestedData { session_id })
    }

    /// Creates a CancellationRequested event.
    pub fn cancellation_requested(session_id: CorrelationId, reason: Option<String>) -> Self {
        SessionEvent::CancellationRequested(CancellationRequestedData { session_id, reason })
    }

    /// Creates a StepExecutionFailed event.
    pub fn step_execution_failed(
        session_id: CorrelationId,
        stage: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        SessionEvent::StepExecutionFailed(StepFailure::new(session_id, stage, reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_session_created_initiates() {
        let id = CorrelationId::new();
        assert!(
            SessionEvent::session_created(id, Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4())
                .is_initiating()
        );
        assert!(!SessionEvent::schedule_validated(id, true).is_initiating());
        assert!(!SessionEvent::cancellation_requested(id, None).is_initiating());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let event = SessionEvent::cancellation_requested(
            CorrelationId::new(),
            Some("mentor unavailable".to_string()),
        );
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: SessionEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.event_type(), "CancellationRequested");
    }
}
