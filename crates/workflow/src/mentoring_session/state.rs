//! Mentoring-session state machine.

use serde::{Deserialize, Serialize};

use crate::machine::WorkflowState;

/// The state of a mentoring session in its lifecycle.
///
/// State transitions:
/// ```text
/// Created ──► ValidatingSchedule ──► SendingNotifications ──► Scheduled ──► Completed
///                     │                                           │
///                     └──────────────► Cancelled ◄────────────────┘
/// ```
///
/// `ScheduleValidated` is a non-addressable intermediate: the compound
/// transition that passed through it collapses to `SendingNotifications`
/// and it is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SessionState {
    /// Session request received.
    #[default]
    Created,

    /// The schedule executor is validating the proposed slot.
    ValidatingSchedule,

    /// Non-addressable intermediate after a successful validation.
    ScheduleValidated,

    /// Participant notifications are being sent.
    SendingNotifications,

    /// Session is on the calendar, awaiting its outcome.
    Scheduled,

    /// Session took place (terminal state).
    Completed,

    /// Session was cancelled or its schedule was invalid (terminal state).
    Cancelled,
}

impl WorkflowState for SessionState {
    fn as_str(&self) -> &'static str {
        match self {
            SessionState::Created => "Created",
            SessionState::ValidatingSchedule => "ValidatingSchedule",
            SessionState::ScheduleValidated => "ScheduleValidated",
            SessionState::SendingNotifications => "SendingNotifications",
            SessionState::Scheduled => "Scheduled",
            SessionState::Completed => "Completed",
            SessionState::Cancelled => "Cancelled",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|state| state.as_str() == s)
    }

    fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Completed | SessionState::Cancelled)
    }

    fn is_addressable(&self) -> bool {
        !matches!(self, SessionState::ScheduleValidated)
    }

    fn all() -> &'static [Self] {
        &[
            SessionState::Created,
            SessionState::ValidatingSchedule,
            SessionState::ScheduleValidated,
            SessionState::SendingNotifications,
            SessionState::Scheduled,
            SessionState::Completed,
            SessionState::Cancelled,
        ]
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_created() {
        assert_eq!(SessionState::default(), SessionState::Created);
    }

    #[test]
    fn test_terminal_states() {
        assert!(SessionState::Completed.is_terminal());
        assert!(SessionState::Cancelled.is_terminal());
        assert!(!SessionState::Scheduled.is_terminal());
    }

    #[test]
    fn test_non_addressable_intermediate() {
        assert!(!SessionState::ScheduleValidated.is_addressable());
        assert!(SessionState::SendingNotifications.is_addressable());
    }

    #[test]
    fn test_parse_roundtrip() {
        for state in SessionState::all() {
            assert_eq!(SessionState::parse(state.as_str()), Some(*state));
        }
    }

    #[test]
    fn test_declares_seven_states() {
        assert_eq!(SessionState::all().len(), 7);
    }
}
