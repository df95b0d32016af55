//! Course-enrollment workflow.
//!
//! Linear enrollment pipeline with one binary decision point: the
//! capacity check. A full course routes straight to the
//! `EnrollmentFailed` terminal and no downstream command is ever
//! emitted; the happy path confirms the enrollment, sends the welcome
//! email, grants access, and ends in `Completed`.

mod commands;
mod data;
mod events;
mod state;

pub use commands::EnrollmentCommand;
pub use data::EnrollmentData;
pub use events::{
    AccessGrantedData, CapacityCheckedData, EnrollmentConfirmedData, EnrollmentEvent,
    EnrollmentRequestedData, WelcomeEmailSentData,
};
pub use state::EnrollmentState;

use std::sync::LazyLock;

use uuid::Uuid;

use crate::machine::{Transition, TransitionTable, Workflow, WorkflowEvent};

/// The course-enrollment workflow definition.
pub struct CourseEnrollment;

// Closure parameters carry explicit types: the workflow parameter of a
// row is not inferrable from its state arguments alone.
static TABLE: LazyLock<TransitionTable<CourseEnrollment>> = LazyLock::new(|| {
    use EnrollmentData as D;
    use EnrollmentEvent as E;
    use EnrollmentState as S;

    TransitionTable::new(vec![
        Transition::new(S::Initiated, "EnrollmentRequested", S::CheckingCapacity)
            .mutating(|event: &E, data: &mut D| {
                if let E::EnrollmentRequested(payload) = event {
                    data.learner_id = Some(payload.learner_id);
                    data.course_id = Some(payload.course_id);
                }
            })
            .emitting(|event: &E, data: &D| {
                vec![EnrollmentCommand::CheckCapacity {
                    enrollment_id: event.correlation_id(),
                    course_id: data.course_id.unwrap_or_else(Uuid::nil),
                }]
            }),
        // Positive capacity check collapses through CapacityConfirmed
        // straight into confirmation.
        Transition::new(S::CheckingCapacity, "CapacityChecked", S::ConfirmingEnrollment)
            .when(|event: &E, _: &D| matches!(event, E::CapacityChecked(p) if p.has_capacity))
            .mutating(|_: &E, data: &mut D| data.has_capacity = Some(true))
            .emitting(|event: &E, data: &D| {
                vec![EnrollmentCommand::ConfirmEnrollment {
                    enrollment_id: event.correlation_id(),
                    learner_id: data.learner_id.unwrap_or_else(Uuid::nil),
                    course_id: data.course_id.unwrap_or_else(Uuid::nil),
                }]
            }),
        Transition::new(S::CheckingCapacity, "CapacityChecked", S::EnrollmentFailed)
            .when(|event: &E, _: &D| matches!(event, E::CapacityChecked(p) if !p.has_capacity))
            .mutating(|_: &E, data: &mut D| data.has_capacity = Some(false)),
        Transition::new(
            S::ConfirmingEnrollment,
            "EnrollmentConfirmed",
            S::SendingWelcomeEmail,
        )
        .emitting(|event: &E, data: &D| {
            vec![EnrollmentCommand::SendWelcomeEmail {
                enrollment_id: event.correlation_id(),
                learner_id: data.learner_id.unwrap_or_else(Uuid::nil),
            }]
        }),
        Transition::new(S::SendingWelcomeEmail, "WelcomeEmailSent", S::GrantingAccess)
            .mutating(|_: &E, data: &mut D| data.welcome_email_sent = true)
            .emitting(|event: &E, data: &D| {
                vec![EnrollmentCommand::GrantAccess {
                    enrollment_id: event.correlation_id(),
                    learner_id: data.learner_id.unwrap_or_else(Uuid::nil),
                    course_id: data.course_id.unwrap_or_else(Uuid::nil),
                }]
            }),
        Transition::new(S::GrantingAccess, "AccessGranted", S::Completed)
            .mutating(|_: &E, data: &mut D| data.access_granted = true),
    ])
});

impl Workflow for CourseEnrollment {
    type State = EnrollmentState;
    type Event = EnrollmentEvent;
    type Command = EnrollmentCommand;
    type Data = EnrollmentData;

    fn workflow_type() -> &'static str {
        "CourseEnrollment"
    }

    fn initial_state() -> Self::State {
        EnrollmentState::Initiated
    }

    fn failure_state() -> Self::State {
        EnrollmentState::EnrollmentFailed
    }

    fn pending_stage(state: Self::State) -> Option<&'static str> {
        match state {
            EnrollmentState::CheckingCapacity => Some("CheckCapacity"),
            EnrollmentState::ConfirmingEnrollment => Some("ConfirmEnrollment"),
            EnrollmentState::SendingWelcomeEmail => Some("SendWelcomeEmail"),
            EnrollmentState::GrantingAccess => Some("GrantAccess"),
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
        state: EnrollmentState,
        data: &EnrollmentData,
        event: EnrollmentEvent,
    ) -> (EnrollmentState, EnrollmentData, Vec<EnrollmentCommand>) {
        match CourseEnrollment::table().apply(state, data, &event) {
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
        CourseEnrollment::table().validate().unwrap();
    }

    #[test]
    fn test_happy_path_to_completed() {
        let enrollment_id = CorrelationId::new();
        let learner_id = uuid::Uuid::new_v4();
        let course_id = uuid::Uuid::new_v4();
        let data = EnrollmentData::default();

        let (state, data, commands) = transition(
            EnrollmentState::Initiated,
            &data,
            EnrollmentEvent::enrollment_requested(enrollment_id, learner_id, course_id),
        );
        assert_eq!(state, EnrollmentState::CheckingCapacity);
        assert_eq!(data.learner_id, Some(learner_id));
        assert_eq!(commands[0].command_type(), "CheckCapacity");

        let (state, data, commands) = transition(
            state,
            &data,
            EnrollmentEvent::capacity_checked(enrollment_id, true),
        );
        assert_eq!(state, EnrollmentState::ConfirmingEnrollment);
        assert_eq!(data.has_capacity, Some(true));
        assert!(matches!(
            commands[0],
            EnrollmentCommand::ConfirmEnrollment {
                learner_id: l,
                course_id: c,
                ..
            } if l == learner_id && c == course_id
        ));

        let (state, data, commands) = transition(
            state,
            &data,
            EnrollmentEvent::enrollment_confirmed(enrollment_id),
        );
        assert_eq!(state, EnrollmentState::SendingWelcomeEmail);
        assert_eq!(commands[0].command_type(), "SendWelcomeEmail");

        let (state, data, commands) = transition(
            state,
            &data,
            EnrollmentEvent::welcome_email_sent(enrollment_id),
        );
        assert_eq!(state, EnrollmentState::GrantingAccess);
        assert!(data.welcome_email_sent);
        assert_eq!(commands[0].command_type(), "GrantAccess");

        let (state, data, commands) =
            transition(state, &data, EnrollmentEvent::access_granted(enrollment_id));
        assert_eq!(state, EnrollmentState::Completed);
        assert!(state.is_terminal());
        assert!(data.access_granted);
        assert!(commands.is_empty());
    }

    #[test]
    fn test_capacity_failure_terminates_without_commands() {
        let enrollment_id = CorrelationId::new();
        let data = EnrollmentData::default();

        let (state, data, commands) = transition(
            EnrollmentState::CheckingCapacity,
            &data,
            EnrollmentEvent::capacity_checked(enrollment_id, false),
        );
        assert_eq!(state, EnrollmentState::EnrollmentFailed);
        assert!(state.is_terminal());
        assert_eq!(data.has_capacity, Some(false));
        // No ConfirmEnrollment (or anything else) may ever be emitted
        assert!(commands.is_empty());
    }

    #[test]
    fn test_duplicate_capacity_check_after_advance_is_noop() {
        let enrollment_id = CorrelationId::new();
        let data = EnrollmentData::default();

        // Instance already advanced past the capacity check
        let outcome = CourseEnrollment::table().apply(
            EnrollmentState::SendingWelcomeEmail,
            &data,
            &EnrollmentEvent::capacity_checked(enrollment_id, true),
        );
        assert!(matches!(outcome, Applied::Ignored));
    }

    #[test]
    fn test_terminal_states_absorb_everything() {
        let enrollment_id = CorrelationId::new();
        let data = EnrollmentData::default();

        for state in [EnrollmentState::Completed, EnrollmentState::EnrollmentFailed] {
            let outcome = CourseEnrollment::table().apply(
                state,
                &data,
                &EnrollmentEvent::enrollment_confirmed(enrollment_id),
            );
            assert!(matches!(outcome, Applied::Ignored));
        }
    }

    fn position(state: EnrollmentState) -> usize {
        EnrollmentState::all()
            .iter()
            .position(|s| *s == state)
            .unwrap()
    }

    #[test]
    fn test_every_edge_moves_forward() {
        for transition in CourseEnrollment::table().transitions() {
            assert!(
                position(transition.next) > position(transition.from),
                "{transition:?} regresses in graph order"
            );
        }
    }

    #[test]
    fn test_every_waiting_state_can_progress() {
        let table = CourseEnrollment::table();
        for state in EnrollmentState::all() {
            if state.is_terminal() || !state.is_addressable() {
                continue;
            }
            assert!(
                table.edges_from(*state).next().is_some(),
                "{state} has no outgoing edges"
            );
        }
        assert!(table.declares_edge(
            EnrollmentState::CheckingCapacity,
            EnrollmentState::EnrollmentFailed
        ));
    }
}
