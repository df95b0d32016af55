//! Mentor-application commands.

use common::CorrelationId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::machine::WorkflowCommand;

/// Final outcome carried by the notification command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationStatus {
    /// The application was approved.
    Approved,
    /// The application was rejected.
    Rejected,
}

/// Commands handed to the mentor-application step-executors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ApplicationCommand {
    /// Validate the applicant's uploaded documents.
    ValidateDocuments {
        request_id: CorrelationId,
        applicant_id: Uuid,
    },

    /// Run the applicant's background check.
    RequestBackgroundCheck {
        request_id: CorrelationId,
        applicant_id: Uuid,
    },

    /// Pick and assign a reviewer.
    AssignReviewer { request_id: CorrelationId },

    /// Notify the applicant of the outcome.
    SendApplicationNotification {
        request_id: CorrelationId,
        status: NotificationStatus,
    },
}

impl WorkflowCommand for ApplicationCommand {
    fn command_type(&self) -> &'static str {
        match self {
            ApplicationCommand::ValidateDocuments { .. } => "ValidateDocuments",
            ApplicationCommand::RequestBackgroundCheck { .. } => "RequestBackgroundCheck",
            ApplicationCommand::AssignReviewer { .. } => "AssignReviewer",
            ApplicationCommand::SendApplicationNotification { .. } => {
                "SendApplicationNotification"
            }
        }
    }

    fn correlation_id(&self) -> CorrelationId {
        match self {
            ApplicationCommand::ValidateDocuments { request_id, .. }
            | ApplicationCommand::RequestBackgroundCheck { request_id, .. }
            | ApplicationCommand::AssignReviewer { request_id }
            | ApplicationCommand::SendApplicationNotification { request_id, .. } => *request_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_types() {
        let id = CorrelationId::new();
        let command = ApplicationCommand::SendApplicationNotification {
            request_id: id,
            status: NotificationStatus::Rejected,
        };
        assert_eq!(command.command_type(), "SendApplicationNotification");
        assert_eq!(command.correlation_id(), id);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let command = ApplicationCommand::ValidateDocuments {
            request_id: CorrelationId::new(),
            applicant_id: Uuid::new_v4(),
        };
        let json = serde_json::to_string(&command).unwrap();
        let deserialized: ApplicationCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.command_type(), "ValidateDocuments");
    }
}
