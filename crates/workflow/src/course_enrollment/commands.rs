//! Course-enrollment commands.

use common::CorrelationId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::machine::WorkflowCommand;

/// Commands handed to the course-enrollment step-executors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EnrollmentCommand {
    /// Check whether the course still has a seat.
    CheckCapacity {
        enrollment_id: CorrelationId,
        course_id: Uuid,
    },

    /// Confirm the enrollment record.
    ConfirmEnrollment {
        enrollment_id: CorrelationId,
        learner_id: Uuid,
        course_id: Uuid,
    },

    /// Send the welcome email to the learner.
    SendWelcomeEmail {
        enrollment_id: CorrelationId,
        learner_id: Uuid,
    },

    /// Grant the learner access to the course content.
    GrantAccess {
        enrollment_id: CorrelationId,
        learner_id: Uuid,
        course_id: Uuid,
    },
}

impl WorkflowCommand for EnrollmentCommand {
    fn command_type(&self) -> &'static str {
        match self {
            EnrollmentCommand::CheckCapacity { .. } => "CheckCapacity",
            EnrollmentCommand::ConfirmEnrollment { .. } => "ConfirmEnrollment",
            EnrollmentCommand::SendWelcomeEmail { .. } => "SendWelcomeEmail",
            EnrollmentCommand::GrantAccess { .. } => "GrantAccess",
        }
    }

    fn correlation_id(&self) -> CorrelationId {
        match self {
            EnrollmentCommand::CheckCapacity { enrollment_id, .. }
            | EnrollmentCommand::ConfirmEnrollment { enrollment_id, .. }
            | EnrollmentCommand::SendWelcomeEmail { enrollment_id, .. }
            | EnrollmentCommand::GrantAccess { enrollment_id, .. } => *enrollment_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_types() {
        let id = CorrelationId::new();
        let command = EnrollmentCommand::CheckCapacity {
            enrollment_id: id,
            course_id: Uuid::new_v4(),
        };
        assert_eq!(command.command_type(), "CheckCapacity");
        assert_eq!(command.correlation_id(), id);
    }
}
