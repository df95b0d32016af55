//! Mentoring-session workflow.
//!
//! Schedule validation feeds a single decision point: a valid slot
//! proceeds to participant notifications and lands the session in
//! `Scheduled`, an invalid one cancels it outright. From `Scheduled`
//! either a completion or a cancellation event reaches the respective
//! terminal; a cancellation delivered in any other state is an
//! unmatched no-op.

mod commands;
mod data;
mod events;
mod state;

pub use commands::SessionCommand;
pub use data::SessionData;
pub use events::{
    CancellationRequestedData, CompletionRequestedData, NotificationsSentData,
    ScheduleValidatedData, SessionCreatedData, SessionEvent,
};
pub use state::SessionState;

use std::sync::LazyLock;

use uuid::Uuid;

use crate::machine::{Transition, TransitionTable, Workflow, WorkflowEvent};

/// The mentoring-session workflow definition.
pub struct MentoringSession;

// Closure parameters carry explicit types: the workflow parameter of a
// row is not inferrable from its state arguments alone.
static TABLE: LazyLock<TransitionTable<MentoringSession>> = LazyLock::new(|| {
    use SessionData as D;
    use SessionEvent as E;
    use SessionState as S;

    TransitionTable::new(vec![
        Transition::new(S::Created, "SessionCreated", S::ValidatingSchedule)
            .mutating(|event: &E, data: &mut D| {
                if let E::SessionCreated(payload) = event {
                    data.mentor_id = Some(payload.mentor_id);
                    data.mentee_id = Some(payload.mentee_id);
                    data.schedule_id = Some(payload.schedule_id);
                }
            })
            .emitting(|event: &E, data: &D| {
                vec![SessionCommand::ValidateSchedule {
                    session_id: event.correlation_id(),
                    schedule_id: data.schedule_id.unwrap_or_else(Uuid::nil),
                }]
            }),
        // A valid schedule collapses through ScheduleValidated straight
        // into the notification stage.
        Transition::new(S::ValidatingSchedule, "ScheduleValidated", S::SendingNotifications)
            .when(|event: &E, _: &D| matches!(event, E::ScheduleValidated(p) if p.is_valid))
            .mutating(|_: &E, data: &mut D| data.schedule_valid = Some(true))
            .emitting(|event: &E, data: &D| {
                vec![SessionCommand::SendSessionNotifications {
                    session_id: event.correlation_id(),
                    mentor_id: data.mentor_id.unwrap_or_else(Uuid::nil),
                    mentee_id: data.mentee_id.unwrap_or_else(Uuid::nil),
                }]
            }),
        Transition::new(S::ValidatingSchedule, "ScheduleValidated", S::Cancelled)
            .when(|event: &E, _: &D| matches!(event, E::ScheduleValidated(p) if !p.is_valid))
            .mutating(|_: &E, data: &mut D| {
                data.schedule_valid = Some(false);
                data.cancellation_reason = Some("invalid schedule".to_string());
            }),
        Transition::new(S::SendingNotifications, "NotificationsSent", S::Scheduled),
        Transition::new(S::Scheduled, "CompletionRequested", S::Completed),
        Transition::new(S::Scheduled, "CancellationRequested", S::Cancelled).mutating(
            |event: &E, data: &mut D| {
                if let E::CancellationRequested(payload) = event {
                    data.cancellation_reason = payload
                        .reason
                        .clone()
                        .or_else(|| Some("cancelled by participant".to_string()));
                }
            },
        ),
    ])
});

impl Workflow for MentoringSession {
    type State = SessionState;
    type Event = SessionEvent;
    type Command = SessionCommand;
    type Data = SessionData;

    fn workflow_type() -> &'static str {
        "MentoringSession"
    }

    fn initial_state() -> Self::State {
        SessionState::Created
    }

    fn failure_state() -> Self::State {
        SessionState::Cancelled
    }

    fn pending_stage(state: Self::State) -> Option<&'static str> {
        match state {
            SessionState::ValidatingSchedule => Some("ValidateSchedule"),
            SessionState::SendingNotifications => Some("SendSessionNotifications"),
            // Scheduled waits on the participants, not an executor
            _ => None,
        }
    }

    fn table() -> &'static TransitionTable<Self> {
        &TABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::{Applied, WorkflowCommand, WorkflowState};
    use common::CorrelationId;

    fn transition(
        state: SessionState,
        data: &SessionData,
        event: SessionEvent,
    ) -> (SessionState, SessionData, Vec<SessionCommand>) {
        match MentoringSession::table().apply(state, data, &event) {
            Applied::Transitioned {
                next,
                data,
                commands,
            } => (next, data, commands),
            other => panic!("expected transition from {state} on {event:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_definition_is_structurally_valid() {
        MentoringSession::table().validate().unwrap();
    }

    #[test]
    fn test_happy_path_to_completed() {
        let session_id = CorrelationId::new();
        let mentor_id = uuid::Uuid::new_v4();
        let mentee_id = uuid::Uuid::new_v4();
        let schedule_id = uuid::Uuid::new_v4();
        let data = SessionData::default();

        let (state, data, commands) = transition(
            SessionState::Created,
            &data,
            SessionEvent::session_created(session_id, mentor_id, mentee_id, schedule_id),
        );
        assert_eq!(state, SessionState::ValidatingSchedule);
        assert_eq!(data.schedule_id, Some(schedule_id));
        assert_eq!(commands[0].command_type(), "ValidateSchedule");

        let (state, data, commands) = transition(
            state,
            &data,
            SessionEvent::schedule_validated(session_id, true),
        );
        assert_eq!(state, SessionState::SendingNotifications);
        assert_eq!(data.schedule_valid, Some(true));
        assert!(matches!(
            commands[0],
            SessionCommand::SendSessionNotifications {
                mentor_id: m,
                mentee_id: n,
                ..
            } if m == mentor_id && n == mentee_id
        ));

        let (state, data, commands) =
            transition(state, &data, SessionEvent::notifications_sent(session_id));
        assert_eq!(state, SessionState::Scheduled);
        assert!(commands.is_empty());

        let (state, _, commands) = transition(
            state,
            &data,
            SessionEvent::completion_requested(session_id),
        );
        assert_eq!(state, SessionState::Completed);
        assert!(state.is_terminal());
        assert!(commands.is_empty());
    }

    #[test]
    fn test_invalid_schedule_cancels_immediately() {
        let session_id = CorrelationId::new();
        let data = SessionData::default();

        let (state, data, commands) = transition(
            SessionState::ValidatingSchedule,
            &data,
            SessionEvent::schedule_validated(session_id, false),
        );
        assert_eq!(state, SessionState::Cancelled);
        assert!(state.is_terminal());
        assert_eq!(data.schedule_valid, Some(false));
        assert_eq!(data.cancellation_reason.as_deref(), Some("invalid schedule"));
        assert!(commands.is_empty());
    }

    #[test]
    fn test_cancellation_from_scheduled() {
        let session_id = CorrelationId::new();
        let data = SessionData::default();

        let (state, data, _) = transition(
            SessionState::Scheduled,
            &data,
            SessionEvent::cancellation_requested(session_id, Some("mentor ill".into())),
        );
        assert_eq!(state, SessionState::Cancelled);
        assert_eq!(data.cancellation_reason.as_deref(), Some("mentor ill"));
    }

    #[test]
    fn test_cancellation_outside_scheduled_is_noop() {
        let session_id = CorrelationId::new();
        let data = SessionData::default();

        for state in [
            SessionState::Created,
            SessionState::ValidatingSchedule,
            SessionState::SendingNotifications,
        ] {
            let outcome = MentoringSession::table().apply(
                state,
                &data,
                &SessionEvent::cancellation_requested(session_id, None),
            );
            assert!(matches!(outcome, Applied::Ignored), "state {state}");
        }
    }

    #[test]
    fn test_terminal_states_absorb_everything() {
        let session_id = CorrelationId::new();
        let data = SessionData::default();

        for state in [SessionState::Completed, SessionState::Cancelled] {
            let outcome = MentoringSession::table().apply(
                state,
                &data,
                &SessionEvent::completion_requested(session_id),
            );
            assert!(matches!(outcome, Applied::Ignored));
        }
    }

    fn position(state: SessionState) -> usize {
        SessionState::all().iter().position(|s| *s == state).unwrap()
    }

    #[test]
    fn test_every_edge_moves_forward() {
        for transition in MentoringSession::table().transitions() {
            assert!(
                position(transition.next) > position(transition.from),
                "{transition:?} regresses in graph order"
            );
        }
    }

    #[test]
    fn test_every_waiting_state_can_progress() {
        let table = MentoringSession::table();
        for state in SessionState::all() {
            if state.is_terminal() || !state.is_addressable() {
                continue;
            }
            assert!(
                table.edges_from(*state).next().is_some(),
                "{state} has no outgoing edges"
            );
        }
        // Cancellation is reachable from both validation and Scheduled.
        assert!(table.declares_edge(SessionState::ValidatingSchedule, SessionState::Cancelled));
        assert!(table.declares_edge(SessionState::Scheduled, SessionState::Cancelled));
    }
}
