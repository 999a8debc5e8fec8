//! Request rewrite.
//!
//! Agent and tool references that point at the placeholder are retargeted at
//! the real provider by deterministic name substitution.

use crate::chat::{AgentDescriptor, ChatRequest, RequestPart, VariableEntry, VariableKind};
use crate::ids::{AgentId, ToolId};
use crate::settings::model::ProviderNaming;

/// `placeholder.chat` → `realprovider.chat`.
pub fn provider_agent_id(naming: &ProviderNaming, agent_id: &AgentId) -> Option<AgentId> {
    let prefix = format!("{}.", naming.placeholder_agent_namespace);
    let name = agent_id.as_str().strip_prefix(&prefix)?;
    Some(AgentId::new(format!(
        "{}.{}",
        naming.provider_agent_namespace.to_lowercase(),
        name
    )))
}

/// `placeholder.tools.search` → `realProvider_search`.
pub fn provider_tool_id(naming: &ProviderNaming, tool_id: &ToolId) -> Option<ToolId> {
    let name = tool_id
        .as_str()
        .strip_prefix(naming.placeholder_tool_prefix.as_str())?;
    Some(ToolId::new(format!("{}{}", naming.provider_tool_prefix, name)))
}

/// Returns a copy of `request` targeting the real provider.
///
/// Agent parts are only replaced when `resolve_agent` knows the provider agent.
/// Every rewritten tool part gets a matching tool entry appended to the
/// request variables.
pub fn rewrite_request<F>(request: &ChatRequest, naming: &ProviderNaming, resolve_agent: F) -> ChatRequest
where
    F: Fn(&AgentId) -> Option<AgentDescriptor>,
{
    let mut rewritten = request.clone();
    let mut tool_entries = Vec::new();

    for part in rewritten.message.parts.iter_mut() {
        match part {
            RequestPart::Agent { agent, .. } => {
                if let Some(provider_agent) =
                    provider_agent_id(naming, &agent.id).and_then(|id| resolve_agent(&id))
                {
                    *agent = provider_agent;
                }
            }
            RequestPart::Tool {
                range,
                tool_id,
                tool_name,
                ..
            } => {
                if let Some(provider_tool) = provider_tool_id(naming, tool_id) {
                    tool_entries.push(VariableEntry {
                        id: provider_tool.as_str().to_string(),
                        name: tool_name.clone(),
                        kind: VariableKind::Tool,
                        range: Some(*range),
                    });
                    *tool_id = provider_tool;
                }
            }
            RequestPart::Text { .. } => {}
        }
    }

    for entry in tool_entries {
        if !rewritten.variables.iter().any(|existing| existing.id == entry.id) {
            rewritten.variables.push(entry);
        }
    }

    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{ChatLocation, ChatMessage, OffsetRange};
    use crate::ids::SessionId;

    fn agent(id: &str, is_placeholder: bool) -> AgentDescriptor {
        AgentDescriptor {
            id: AgentId::from(id),
            name: "chat".to_string(),
            is_placeholder,
        }
    }

    fn request() -> ChatRequest {
        ChatRequest::new(
            SessionId::from("s1"),
            ChatLocation::Panel,
            ChatMessage {
                text: "@chat #search find it".to_string(),
                parts: vec![
                    RequestPart::Agent {
                        range: OffsetRange::new(0, 5),
                        agent: agent("placeholder.chat", true),
                    },
                    RequestPart::Tool {
                        range: OffsetRange::new(6, 13),
                        tool_id: ToolId::from("placeholder.tools.search"),
                        tool_name: "search".to_string(),
                        display_name: "Search".to_string(),
                    },
                    RequestPart::Text {
                        range: OffsetRange::new(13, 21),
                        text: " find it".to_string(),
                    },
                ],
            },
        )
    }

    #[test]
    fn rewrites_agent_and_tool_references() {
        let naming = ProviderNaming::default();
        let rewritten = rewrite_request(&request(), &naming, |id| {
            (id.as_str() == "realprovider.chat").then(|| agent("realprovider.chat", false))
        });

        assert_eq!(
            rewritten.agent().map(|a| a.id.as_str()),
            Some("realprovider.chat")
        );
        let tool_id = rewritten.message.parts.iter().find_map(|part| match part {
            RequestPart::Tool { tool_id, .. } => Some(tool_id.as_str().to_string()),
            _ => None,
        });
        assert_eq!(tool_id.as_deref(), Some("realProvider_search"));
        assert_eq!(rewritten.variables.len(), 1);
        assert_eq!(rewritten.variables[0].id, "realProvider_search");
        assert_eq!(rewritten.variables[0].kind, VariableKind::Tool);
        assert_eq!(rewritten.message.text, request().message.text);
    }

    #[test]
    fn unknown_provider_agent_keeps_original_reference() {
        let rewritten = rewrite_request(&request(), &ProviderNaming::default(), |_| None);
        assert_eq!(
            rewritten.agent().map(|a| a.id.as_str()),
            Some("placeholder.chat")
        );
    }

    #[test]
    fn foreign_ids_are_left_alone() {
        let naming = ProviderNaming::default();
        assert_eq!(
            provider_tool_id(&naming, &ToolId::from("other_search")),
            None
        );
        assert_eq!(
            provider_agent_id(&naming, &AgentId::from("placeholderish.chat")),
            None
        );
    }
}
