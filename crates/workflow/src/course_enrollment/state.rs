//! Course-enrollment state machine.

use serde::{Deserialize, Serialize};

use crate::machine::WorkflowState;

/// The state of a course enrollment in its lifecycle.
///
/// State transitions:
/// ```text
/// Initiated ──► CheckingCapacity ──► ConfirmingEnrollment ──► SendingWelcomeEmail
///                      │                                              │
///                      ▼                                              ▼
///               EnrollmentFailed                 Completed ◄── GrantingAccess
/// ```
///
/// `CapacityConfirmed` and `EnrollmentConfirmed` are non-addressable
/// intermediates: the compound transitions that passed through them
/// collapse to their final target and they are never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EnrollmentState {
    /// Enrollment request received.
    #[default]
    Initiated,

    /// The capacity executor is checking available seats.
    CheckingCapacity,

    /// Non-addressable intermediate after a positive capacity check.
    CapacityConfirmed,

    /// The enrollment record is being confirmed.
    ConfirmingEnrollment,

    /// Non-addressable intermediate after confirmation.
    EnrollmentConfirmed,

    /// The welcome email is being sent.
    SendingWelcomeEmail,

    /// Course access is being granted.
    GrantingAccess,

    /// Enrollment fully processed (terminal state).
    Completed,

    /// Enrollment failed, e.g. the course was full (terminal state).
    EnrollmentFailed,
}

impl WorkflowState for EnrollmentState {
    fn as_str(&self) -> &'static str {
        match self {
            EnrollmentState::Initiated => "Initiated",
            EnrollmentState::CheckingCapacity => "CheckingCapacity",
            EnrollmentState::CapacityConfirmed => "CapacityConfirmed",
            EnrollmentState::ConfirmingEnrollment => "ConfirmingEnrollment",
            EnrollmentState::EnrollmentConfirmed => "EnrollmentConfirmed",
            EnrollmentState::SendingWelcomeEmail => "SendingWelcomeEmail",
            EnrollmentState::GrantingAccess => "GrantingAccess",
            EnrollmentState::Completed => "Completed",
            EnrollmentState::EnrollmentFailed => "EnrollmentFailed",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|state| state.as_str() == s)
    }

    fn is_terminal(&self) -> bool {
        matches!(
            self,
            EnrollmentState::Completed | EnrollmentState::EnrollmentFailed
        )
    }

    fn is_addressable(&self) -> bool {
        !matches!(
            self,
            EnrollmentState::CapacityConfirmed | EnrollmentState::EnrollmentConfirmed
        )
    }

    fn all() -> &'static [Self] {
        &[
            EnrollmentState::Initiated,
            EnrollmentState::CheckingCapacity,
            EnrollmentState::CapacityConfirmed,
            EnrollmentState::ConfirmingEnrollment,
            EnrollmentState::EnrollmentConfirmed,
            EnrollmentState::SendingWelcomeEmail,
            EnrollmentState::GrantingAccess,
            EnrollmentState::Completed,
            EnrollmentState::EnrollmentFailed,
        ]
    }
}

impl std::fmt::Display for EnrollmentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
