//! Course-enrollment events.

use common::CorrelationId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::machine::{StepFailure, WorkflowEvent};

/// Events that drive the course-enrollment workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EnrollmentEvent {
    /// A learner requested enrollment in a course.
    EnrollmentRequested(EnrollmentRequestedData),

    /// The capacity executor reported available seats (or the lack of them).
    CapacityChecked(CapacityCheckedData),

    /// The enrollment record was confirmed.
    EnrollmentConfirmed(EnrollmentConfirmedData),

    /// The welcome email was delivered.
    WelcomeEmailSent(WelcomeEmailSentData),

    /// Course access was granted to the learner.
    AccessGranted(AccessGrantedData),

    /// A step-executor failed while driving a stage.
    StepExecutionFailed(StepFailure),
}

/// Data for the EnrollmentRequested event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentRequestedData {
    /// The enrollment id (correlation key).
    pub enrollment_id: CorrelationId,
    /// The enrolling learner.
    pub learner_id: Uuid,
    /// The course being enrolled in.
    pub course_id: Uuid,
}

/// Data for the CapacityChecked event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityCheckedData {
    /// The enrollment id.
    pub enrollment_id: CorrelationId,
    /// Business outcome: whether the course still has a seat.
    pub has_capacity: bool,
}

/// Data for the EnrollmentConfirmed event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentConfirmedData {
    /// The enrollment id.
    pub enrollment_id: CorrelationId,
}

/// Data for the WelcomeEmailSent event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeEmailSentData {
    /// The enrollment id.
    pub enrollment_id: CorrelationId,
}

/// Data for the AccessGranted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessGrantedData {
    /// The enrollment id.
    pub enrollment_id: CorrelationId,
}

impl WorkflowEvent for EnrollmentEvent {
    fn event_type(&self) -> &'static str {
        match self {
            EnrollmentEvent::EnrollmentRequested(_) => "EnrollmentRequested",
            EnrollmentEvent::CapacityChecked(_) => "CapacityChecked",
            EnrollmentEvent::EnrollmentConfirmed(_) => "EnrollmentConfirmed",
            EnrollmentEvent::WelcomeEmailSent(_) => "WelcomeEmailSent",
            EnrollmentEvent::AccessGranted(_) => "AccessGranted",
            EnrollmentEvent::StepExecutionFailed(_) => "StepExecutionFailed",
        }
    }

    fn correlation_id(&self) -> CorrelationId {
        match self {
            EnrollmentEvent::EnrollmentRequested(data) => data.enrollment_id,
            EnrollmentEvent::CapacityChecked(data) => data.enrollment_id,
            EnrollmentEvent::EnrollmentConfirmed(data) => data.enrollment_id,
            EnrollmentEvent::WelcomeEmailSent(data) => data.enrollment_id,
            EnrollmentEvent::AccessGranted(data) => data.enrollment_id,
            EnrollmentEvent::StepExecutionFailed(failure) => failure.correlation_id,
        }
    }

    fn is_initiating(&self) -> bool {
        matches!(self, EnrollmentEvent::EnrollmentRequested(_))
    }

    fn executor_failure(&self) -> Option<(&str, &str)> {
        match self {
            EnrollmentEvent::StepExecutionFailed(failure) => {
                Some((failure.stage.as_str(), failure.reason.as_str()))
            }
            _ => None,
        }
    }
}

// Convenience constructors
impl EnrollmentEvent {
    /// Creates an EnrollmentRequested event.
    pub fn enrollment_requested(
        enrollment_id: CorrelationId,
        learner_id: Uuid,
        course_id: Uuid,
    ) -> Self {
        EnrollmentEvent::EnrollmentRequested(EnrollmentRequestedData {
            enrollment_id,
            learner_id,
            course_id,
        })
    }

    /// Creates a CapacityChecked event.
    pub fn capacity_checked(enrollment_id: CorrelationId, has_capacity: bool) -> Self {
        EnrollmentEvent::CapacityChecked(CapacityCheckedData {
            enrollment_id,
            has_capacity,
        })
    }

    /// Creates an EnrollmentConfirmed event.
    pub fn enrollment_confirmed(enrollment_id: CorrelationId) -> Self {
        EnrollmentEvent::EnrollmentConfirmed(EnrollmentConfirmedData { enrollment_id })
    }

    /// Creates a WelcomeEmailSent event.
    pub fn welcome_email_sent(enrollment_id: CorrelationId) -> Self {
        EnrollmentEvent::WelcomeEmailSent(WelcomeEmailSentData { enrollment_id })
    }

    /// Creates an AccessGranted event.
    pub fn access_granted(enrollment_id: CorrelationId) -> Self {
        EnrollmentEvent::AccessGranted(AccessGrantedData { enrollment_id })
    }

    /// Creates a StepExecutionFailed event.
    pub fn step_execution_failed(
        enrollment_id: CorrelationId,
        stage: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        EnrollmentEvent::StepExecutionFailed(StepFailure::new(enrollment_id, stage, reason))
    }
}
