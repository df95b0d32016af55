//! Business data accumulated by the mentoring-session workflow.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-instance business data, filled in by transition mutations as
/// the session progresses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionData {
    /// The mentor.
    pub mentor_id: Option<Uuid>,

    /// The mentee.
    pub mentee_id: Option<Uuid>,

    /// The proposed (then confirmed) schedule slot.
    pub schedule_id: Option<Uuid>,

    /// Schedule-validation outcome.
    pub schedule_valid: Option<bool>,

    /// Why the session ended up cancelled, when it did.
    pub cancellation_reason: Option<String>,
}
