//! Business data accumulated by the course-enrollment workflow.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-instance business data, filled in by transition mutations as
/// the enrollment progresses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrollmentData {
    /// The enrolling learner.
    pub learner_id: Option<Uuid>,

    /// The course being enrolled in.
    pub course_id: Option<Uuid>,

    /// Capacity-check outcome.
    pub has_capacity: Option<bool>,

    /// Set once the welcome email is confirmed delivered.
    pub welcome_email_sent: bool,

    /// Set once course access is granted.
    pub access_granted: bool,
}
