use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Business correlation key for a saga instance.
///
/// Every event and command of a workflow carries the id of the business
/// request being orchestrated (application id, enrollment id, session
/// id); the runtime routes on it. The newtype keeps those ids from
/// being confused with the other UUIDs floating through the system
/// (applicants, reviewers, courses). A saga instance is addressed by
/// `(workflow type, correlation id)`, never by the id alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The raw UUID, for query binds and log fields.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for CorrelationId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<CorrelationId> for Uuid {
    fn from(id: CorrelationId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_distinct() {
        assert_ne!(CorrelationId::new(), CorrelationId::new());
    }

    #[test]
    fn conversions_retain_the_wrapped_uuid() {
        let uuid = Uuid::new_v4();
        assert_eq!(CorrelationId::from_uuid(uuid).as_uuid(), uuid);
        assert_eq!(Uuid::from(CorrelationId::from(uuid)), uuid);
    }

    #[test]
    fn serializes_as_a_bare_uuid_string() {
        // The wrapper must be invisible on the wire and in JSONB:
        // events produced by non-Rust services carry plain UUIDs.
        let id = CorrelationId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));

        let back: CorrelationId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
