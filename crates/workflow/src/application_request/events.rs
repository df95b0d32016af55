//! Mentor-application events.

use common::CorrelationId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::machine::{StepFailure, WorkflowEvent};

/// Events that drive the mentor-application workflow.
///
/// `Submitted` is the initiating event; everything else is published by
/// a step-executor (or the reviewer front end) and correlated back to
/// the instance by application id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ApplicationEvent {
    /// A mentor application was submitted.
    Submitted(SubmittedData),

    /// The document executor finished validating the uploaded documents.
    DocumentsValidated(DocumentsValidatedData),

    /// The screening executor finished the background check.
    BackgroundCheckCompleted(BackgroundCheckCompletedData),

    /// A reviewer was assigned to the application.
    ReviewerAssigned(ReviewerAssignedData),

    /// The reviewer recorded a decision.
    ReviewCompleted(ReviewCompletedData),

    /// The outcome notification was delivered.
    NotificationSent(NotificationSentData),

    /// A step-executor failed while driving a stage.
    StepExecutionFailed(StepFailure),
}

/// Data for the Submitted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmittedData {
    /// The application id (correlation key).
    pub request_id: CorrelationId,
    /// The applicant.
    pub applicant_id: Uuid,
}

/// Data for the DocumentsValidated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentsValidatedData {
    /// The application id.
    pub request_id: CorrelationId,
    /// Business outcome of the validation, not an error signal.
    pub is_valid: bool,
}

/// Data for the BackgroundCheckCompleted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackgroundCheckCompletedData {
    /// The application id.
    pub request_id: CorrelationId,
    /// Whether the check passed.
    pub passed: bool,
}

/// Data for the ReviewerAssigned event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewerAssignedData {
    /// The application id.
    pub request_id: CorrelationId,
    /// The assigned reviewer.
    pub reviewer_id: Uuid,
}

/// Data for the ReviewCompleted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewCompletedData {
    /// The application id.
    pub request_id: CorrelationId,
    /// The reviewer's decision.
    pub approved: bool,
    /// Free-form reviewer comments.
    pub comments: Option<String>,
}

/// Data for the NotificationSent event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSentData {
    /// The application id.
    pub request_id: CorrelationId,
}

impl WorkflowEvent for ApplicationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ApplicationEvent::Submitted(_) => "Submitted",
            ApplicationEvent::DocumentsValidated(_) => "DocumentsValidated",
            ApplicationEvent::BackgroundCheckCompleted(_) => "BackgroundCheckCompleted",
            ApplicationEvent::ReviewerAssigned(_) => "ReviewerAssigned",
            ApplicationEvent::ReviewCompleted(_) => "ReviewCompleted",
            ApplicationEvent::NotificationSent(_) => "NotificationSent",
            ApplicationEvent::StepExecutionFailed(_) => "StepExecutionFailed",
        }
    }

    fn correlation_id(&self) -> CorrelationId {
        match self {
            ApplicationEvent::Submitted(data) => data.request_id,
            ApplicationEvent::DocumentsValidated(data) => data.request_id,
            ApplicationEvent::BackgroundCheckCompleted(data) => data.request_id,
            ApplicationEvent::ReviewerAssigned(data) => data.request_id,
            ApplicationEvent::ReviewCompleted(data) => data.request_id,
            ApplicationEvent::NotificationSent(data) => data.request_id,
            ApplicationEvent::StepExecutionFailed(failure) => failure.correlation_id,
        }
    }

    fn is_initiating(&self) -> bool {
        matches!(self, ApplicationEvent::Submitted(_))
    }

    fn executor_failure(&self) -> Option<(&str, &str)> {
        match self {
            ApplicationEvent::StepExecutionFailed(failure) => {
                Some((failure.stage.as_str(), failure.reason.as_str()))
            }
            _ => None,
        }
    }
}

// Convenience constructors
impl ApplicationEvent {
    /// Creates a Submitted event.
    pub fn submitted(request_id: CorrelationId, applicant_id: Uuid) -> Self {
        ApplicationEvent::Submitted(SubmittedData {
            request_id,
            applicant_id,
        })
    }

    /// Creates a DocumentsValidated event.
    pub fn documents_validated(request_id: CorrelationId, is_valid: bool) -> Self {
        ApplicationEvent::DocumentsValidated(DocumentsValidatedData {
            request_id,
            is_valid,
        })
    }

    /// Creates a BackgroundCheckCompleted event.
    pub fn background_check_completed(request_id: CorrelationId, passed: bool) -> Self {
        ApplicationEvent::BackgroundCheckCompleted(BackgroundCheckCompletedData {
            request_id,
            passed,
        })
    }

    /// Creates a ReviewerAssigned event.
    pub fn reviewer_assigned(request_id: CorrelationId, reviewer_id: Uuid) -> Self {
        ApplicationEvent::ReviewerAssigned(ReviewerAssignedData {
            request_id,
            reviewer_id,
        })
    }

    /// Creates a ReviewCompleted event.
    pub fn review_completed(
        request_id: CorrelationId,
        approved: bool,
        comments: Option<String>,
    ) -> Self {
        ApplicationEvent::ReviewCompleted(ReviewCompletedData {
            request_id,
            approved,
            comments,
        })
    }

    /// Creates a NotificationSent event.
    pub fn notification_sent(request_id: CorrelationId) -> Self {
        ApplicationEvent::NotificationSent(NotificationSentData { request_id })
    }

    /// Creates a StepExecutionFailed event.
    pub fn step_execution_failed(
        request_id: CorrelationId,
        stage: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ApplicationEvent::StepExecutionFailed(StepFailure::new(request_id, stage, reason))
    }
}
