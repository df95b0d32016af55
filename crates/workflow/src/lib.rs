//! Workflow definitions for the mentoring platform orchestration core.
//!
//! This crate provides the state-machine model:
//! - `Workflow` and companion traits for states, events, and commands
//! - `TransitionTable`, an explicit, inspectable map from
//!   `(state, event tag)` to `{guard, mutate, next state, emitted commands}`
//! - The three hosted workflow definitions: mentor-application review,
//!   course enrollment, and mentoring-session creation
//!
//! Transition functions are pure: given the same state, data, and event
//! they always produce the same outcome, which is what makes saga replay
//! deterministic.

pub mod application_request;
pub mod course_enrollment;
pub mod machine;
pub mod mentoring_session;

pub use application_request::ApplicationRequest;
pub use course_enrollment::CourseEnrollment;
pub use machine::{
    Applied, DefinitionError, Lookup, Transition, TransitionTable, Workflow, WorkflowCommand,
    WorkflowEvent, WorkflowState,
};
pub use mentoring_session::MentoringSession;
