//! Mentor-application review workflow.
//!
//! Linear review pipeline with three binary decision points: document
//! validation, background check, and the human review decision. Any
//! negative outcome routes straight to the `ApplicationRejected`
//! terminal with a rejection notification; the happy path ends in
//! `Completed` once the approval notification is confirmed sent.

mod commands;
mod data;
mod events;
mod state;

pub use commands::{ApplicationCommand, NotificationStatus};
pub use data::{ApplicationData, ReviewStatus};
pub use events::{
    ApplicationEvent, BackgroundCheckCompletedData, DocumentsValidatedData, NotificationSentData,
    ReviewCompletedData, ReviewerAssignedData, SubmittedData,
};
pub use state::ApplicationState;

use std::sync::LazyLock;

use uuid::Uuid;

use crate::machine::{Transition, TransitionTable, Workflow, WorkflowEvent};

/// The mentor-application review workflow definition.
pub struct ApplicationRequest;

// Closure parameters carry explicit types: the workflow parameter of a
// row is not inferrable from its state arguments alone.
static TABLE: LazyLock<TransitionTable<ApplicationRequest>> = LazyLock::new(|| {
    use ApplicationData as D;
    use ApplicationEvent as E;
    use ApplicationState as S;

    TransitionTable::new(vec![
        Transition::new(S::Submitted, "Submitted", S::ValidatingDocuments)
            .mutating(|event: &E, data: &mut D| {
                if let E::Submitted(payload) = event {
                    data.applicant_id = Some(payload.applicant_id);
                }
            })
            .emitting(|event: &E, _: &D| {
                vec![ApplicationCommand::ValidateDocuments {
                    request_id: event.correlation_id(),
                    applicant_id: applicant_of(event),
                }]
            }),
        Transition::new(
            S::ValidatingDocuments,
            "DocumentsValidated",
            S::RequestingBackgroundCheck,
        )
        .when(|event: &E, _: &D| matches!(event, E::DocumentsValidated(p) if p.is_valid))
        .mutating(|_: &E, data: &mut D| data.documents_valid = Some(true))
        .emitting(|event: &E, data: &D| {
            vec![ApplicationCommand::RequestBackgroundCheck {
                request_id: event.correlation_id(),
                applicant_id: data.applicant_id.unwrap_or_else(Uuid::nil),
            }]
        }),
        Transition::new(
            S::ValidatingDocuments,
            "DocumentsValidated",
            S::ApplicationRejected,
        )
        .when(|event: &E, _: &D| matches!(event, E::DocumentsValidated(p) if !p.is_valid))
        .mutating(|_: &E, data: &mut D| {
            data.documents_valid = Some(false);
            data.review_status = ReviewStatus::Rejected;
        })
        .emitting(|event: &E, _: &D| vec![rejection_notification(event)]),
        Transition::new(
            S::RequestingBackgroundCheck,
            "BackgroundCheckCompleted",
            S::AssigningReviewer,
        )
        .when(|event: &E, _: &D| matches!(event, E::BackgroundCheckCompleted(p) if p.passed))
        .mutating(|_: &E, data: &mut D| data.background_check_passed = Some(true))
        .emitting(|event: &E, _: &D| {
            vec![ApplicationCommand::AssignReviewer {
                request_id: event.correlation_id(),
            }]
        }),
        Transition::new(
            S::RequestingBackgroundCheck,
            "BackgroundCheckCompleted",
            S::ApplicationRejected,
        )
        .when(|event: &E, _: &D| matches!(event, E::BackgroundCheckCompleted(p) if !p.passed))
        .mutating(|_: &E, data: &mut D| {
            data.background_check_passed = Some(false);
            data.review_status = ReviewStatus::Rejected;
        })
        .emitting(|event: &E, _: &D| vec![rejection_notification(event)]),
        Transition::new(S::AssigningReviewer, "ReviewerAssigned", S::UnderReview).mutating(
            |event: &E, data: &mut D| {
                if let E::ReviewerAssigned(payload) = event {
                    data.reviewer_id = Some(payload.reviewer_id);
                }
            },
        ),
        // Approval collapses through the non-addressable
        // ApplicationApproved intermediate straight into notification.
        Transition::new(S::UnderReview, "ReviewCompleted", S::SendingNotification)
            .when(|event: &E, _: &D| matches!(event, E::ReviewCompleted(p) if p.approved))
            .mutating(|event: &E, data: &mut D| {
                data.review_status = ReviewStatus::Approved;
                if let E::ReviewCompleted(payload) = event {
                    data.review_comments = payload.comments.clone();
                }
            })
            .emitting(|event: &E, _: &D| {
                vec![ApplicationCommand::SendApplicationNotification {
                    request_id: event.correlation_id(),
                    status: NotificationStatus::Approved,
                }]
            }),
        Transition::new(S::UnderReview, "ReviewCompleted", S::ApplicationRejected)
            .when(|event: &E, _: &D| matches!(event, E::ReviewCompleted(p) if !p.approved))
            .mutating(|event: &E, data: &mut D| {
                data.review_status = ReviewStatus::Rejected;
                if let E::ReviewCompleted(payload) = event {
                    data.review_comments = payload.comments.clone();
                }
            })
            .emitting(|event: &E, _: &D| vec![rejection_notification(event)]),
        Transition::new(S::SendingNotification, "NotificationSent", S::Completed),
    ])
});

fn applicant_of(event: &ApplicationEvent) -> Uuid {
    match event {
        ApplicationEvent::Submitted(payload) => payload.applicant_id,
        _ => Uuid::nil(),
    }
}

fn rejection_notification(event: &ApplicationEvent) -> ApplicationCommand {
    ApplicationCommand::SendApplicationNotification {
        request_id: event.correlation_id(),
        status: NotificationStatus::Rejected,
    }
}

impl Workflow for ApplicationRequest {
    type State = ApplicationState;
    type Event = ApplicationEvent;
    type Command = ApplicationCommand;
    type Data = ApplicationData;

    fn workflow_type() -> &'static str {
        "ApplicationRequest"
    }

    fn initial_state() -> Self::State {
        ApplicationState::Submitted
    }

    fn failure_state() -> Self::State {
        ApplicationState::ApplicationRejected
    }

    fn pending_stage(state: Self::State) -> Option<&'static str> {
        match state {
            ApplicationState::ValidatingDocuments => Some("ValidateDocuments"),
            ApplicationState::RequestingBackgroundCheck => Some("RequestBackgroundCheck"),
            ApplicationState::AssigningReviewer => Some("AssignReviewer"),
            ApplicationState::SendingNotification => Some("SendApplicationNotification"),
            // UnderReview waits on the human reviewer, not an executor
            _ => None,
        }
    }

    fn table() -> &'static TransitionTable<Self> {
        &TABLE
    }
}
