use serde::{Deserialize, Serialize};

use crate::ids::{AgentId, RequestId, SessionId, ToolId};

/// Chat surface an agent is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatLocation {
    Panel,
    Editor,
    Terminal,
    Notebook,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatMode {
    Ask,
    Edit,
    Agent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    pub id: AgentId,
    pub name: String,
    /// Registered by the setup flow rather than by the provider.
    pub is_placeholder: bool,
}

/// Character range of a part inside the request text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetRange {
    pub start: usize,
    pub end: usize,
}

impl OffsetRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Parsed piece of a request message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestPart {
    Text {
        range: OffsetRange,
        text: String,
    },
    /// `@agent` reference.
    Agent {
        range: OffsetRange,
        agent: AgentDescriptor,
    },
    /// `#tool` reference.
    Tool {
        range: OffsetRange,
        tool_id: ToolId,
        tool_name: String,
        display_name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub text: String,
    pub parts: Vec<RequestPart>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    Tool,
    File,
    Symbol,
}

/// Entry of the request's attached context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableEntry {
    pub id: String,
    pub name: String,
    pub kind: VariableKind,
    pub range: Option<OffsetRange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub id: RequestId,
    pub session_id: SessionId,
    pub location: ChatLocation,
    pub message: ChatMessage,
    pub variables: Vec<VariableEntry>,
    /// Model explicitly picked for this request.
    pub model_id: Option<String>,
}

impl ChatRequest {
    pub fn new(session_id: SessionId, location: ChatLocation, message: ChatMessage) -> Self {
        Self {
            id: RequestId::generate(),
            session_id,
            location,
            message,
            variables: Vec::new(),
            model_id: None,
        }
    }

    /// The request references at least one tool.
    pub fn references_tools(&self) -> bool {
        self.message
            .parts
            .iter()
            .any(|part| matches!(part, RequestPart::Tool { .. }))
    }

    pub fn agent(&self) -> Option<&AgentDescriptor> {
        self.message.parts.iter().find_map(|part| match part {
            RequestPart::Agent { agent, .. } => Some(agent),
            _ => None,
        })
    }
}

/// Mode and model currently selected in the chat input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeSelection {
    pub mode: Option<ChatMode>,
    pub model_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResendOptions {
    pub mode: Option<ChatMode>,
    pub user_selected_model_id: Option<String>,
}
