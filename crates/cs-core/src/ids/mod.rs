//! ID type wrappers for type safety.

mod id_macro;

use serde::{Deserialize, Serialize};

use id_macro::impl_id;

/// Chat session identifier (one transcript / one widget).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

/// Chat agent identifier, e.g. `placeholder.chat`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(String);

/// Language model tool identifier, e.g. `placeholder.tools.search`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ToolId(String);

/// Chat request identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(String);

impl_id!(SessionId, AgentId, ToolId, RequestId);

impl RequestId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_from_str() {
        let id: SessionId = "session-1".into();
        assert_eq!(id.as_str(), "session-1");
        assert_eq!(id.to_string(), "session-1");
    }

    #[test]
    fn test_ids_order_by_value() {
        let mut tools = vec![ToolId::new("b_search"), ToolId::new("a_fetch")];
        tools.sort();
        assert_eq!(tools, vec![ToolId::new("a_fetch"), ToolId::new("b_search")]);
    }

    #[test]
    fn test_generated_request_ids_are_unique() {
        assert_ne!(RequestId::generate(), RequestId::generate());
    }
}
