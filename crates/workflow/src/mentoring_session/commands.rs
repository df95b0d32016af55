//! Mentoring-session commands.

use common::CorrelationId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::machine::WorkflowCommand;

/// Commands handed to the mentoring-session step-executors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SessionCommand {
    /// Validate the proposed schedule slot for both participants.
    ValidateSchedule {
        session_id: CorrelationId,
        schedule_id: Uuid,
    },

    /// Notify mentor and mentee of the scheduled session.
    SendSessionNotifications {
        session_id: CorrelationId,
        mentor_id: Uuid,
        mentee_id: Uuid,
    },
}

impl WorkflowCommand for SessionCommand {
    fn command_type(&self) -> &'static str {
        match self {
            SessionCommand::ValidateSchedule { .. } => "ValidateSchedule",
            SessionCommand::SendSessionNotifications { .. } => "SendSessionNotifications",
        }
    }

    fn correlation_id(&self) -> CorrelationId {
        match self {
            SessionCommand::ValidateSchedule { session_id, .. }
            | SessionCommand::SendSessionNotifications { session_id, .. } => *session_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_types() {
        let id = CorrelationId::new();
        let command = SessionCommand::ValidateSchedule {
            session_id: id,
            schedule_id: Uuid::new_v4(),
        };
        assert_eq!(command.command_type(), "ValidateSchedule");
        assert_eq!(command.correlation_id(), id);
    }
}
