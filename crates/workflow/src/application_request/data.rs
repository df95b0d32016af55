//! Business data accumulated by the mentor-application workflow.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Review outcome recorded on the instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ReviewStatus {
    /// No decision recorded yet.
    #[default]
    Pending,
    /// The application was approved.
    Approved,
    /// The application was rejected.
    Rejected,
}

/// Per-instance business data, filled in by transition mutations as
/// the application progresses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationData {
    /// The applicant.
    pub applicant_id: Option<Uuid>,

    /// The assigned reviewer, once one exists.
    pub reviewer_id: Option<Uuid>,

    /// Document-validation outcome.
    pub documents_valid: Option<bool>,

    /// Background-check outcome.
    pub background_check_passed: Option<bool>,

    /// Final review decision.
    pub review_status: ReviewStatus,

    /// Reviewer comments, if any were recorded.
    pub review_comments: Option<String>,
}
