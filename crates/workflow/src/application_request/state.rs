//! Mentor-application state machine.

use serde::{Deserialize, Serialize};

use crate::machine::WorkflowState;

/// The state of a mentor application in its review lifecycle.
///
/// State transitions:
/// ```text
/// Submitted ──► ValidatingDocuments ──► RequestingBackgroundCheck ──► AssigningReviewer
///                       │                          │                        │
///                       ▼                          ▼                        ▼
///               ApplicationRejected ◄──────────────┴───────────────── UnderReview
///                                                                          │
///                                          Completed ◄── SendingNotification
/// ```
///
/// `DocumentsValidated`, `BackgroundCheckCompleted`, and
/// `ApplicationApproved` are declared for parity with the original
/// review process but are non-addressable: the compound transitions
/// that passed through them collapse to their final target, so they
/// are never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ApplicationState {
    /// Application received; awaiting validation kickoff.
    #[default]
    Submitted,

    /// Documents are being validated by the document executor.
    ValidatingDocuments,

    /// Non-addressable intermediate after document validation.
    DocumentsValidated,

    /// Background check requested from the screening executor.
    RequestingBackgroundCheck,

    /// Non-addressable intermediate after the background check.
    BackgroundCheckCompleted,

    /// A reviewer is being assigned.
    AssigningReviewer,

    /// A human reviewer holds the application.
    UnderReview,

    /// Non-addressable intermediate after an approval decision.
    ApplicationApproved,

    /// Application rejected (terminal state).
    ApplicationRejected,

    /// Outcome notification is being sent.
    SendingNotification,

    /// Application fully processed (terminal state).
    Completed,
}

impl WorkflowState for ApplicationState {
    fn as_str(&self) -> &'static str {
        match self {
            ApplicationState::Submitted => "Submitted",
            ApplicationState::ValidatingDocuments => "ValidatingDocuments",
            ApplicationState::DocumentsValidated => "DocumentsValidated",
            ApplicationState::RequestingBackgroundCheck => "RequestingBackgroundCheck",
            ApplicationState::BackgroundCheckCompleted => "BackgroundCheckCompleted",
            ApplicationState::AssigningReviewer => "AssigningReviewer",
            ApplicationState::UnderReview => "UnderReview",
            ApplicationState::ApplicationApproved => "ApplicationApproved",
            ApplicationState::ApplicationRejected => "ApplicationRejected",
            ApplicationState::SendingNotification => "SendingNotification",
            ApplicationState::Completed => "Completed",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|state| state.as_str() == s)
    }

    fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationState::Completed | ApplicationState::ApplicationRejected
        )
    }

    fn is_addressable(&self) -> bool {
        !matches!(
            self,
            ApplicationState::DocumentsValidated
                | ApplicationState::BackgroundCheckCompleted
                | ApplicationState::ApplicationApproved
        )
    }

    fn all() -> &'static [Self] {
        &[
            ApplicationState::Submitted,
            ApplicationState::ValidatingDocuments,
            ApplicationState::DocumentsValidated,
            ApplicationState::RequestingBackgroundCheck,
            ApplicationState::BackgroundCheckCompleted,
            ApplicationState::AssigningReviewer,
            ApplicationState::UnderReview,
            ApplicationState::ApplicationApproved,
            ApplicationState::ApplicationRejected,
            ApplicationState::SendingNotification,
            ApplicationState::Completed,
        ]
    }
}

impl std::fmt::Display for ApplicationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
