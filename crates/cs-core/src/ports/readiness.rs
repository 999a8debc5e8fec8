//! Readiness oracle port
//!
//! Answers whether the real provider has registered models, tools and agents,
//! and notifies subscribers when any of those registrations change.

use tokio::sync::mpsc;

use crate::chat::{AgentDescriptor, ChatLocation, ChatMode};
use crate::ids::AgentId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadinessChange {
    ModelsChanged,
    ToolsChanged,
    AgentsChanged,
}

pub trait ReadinessOraclePort: Send + Sync {
    /// `Some(id)`: that model is registered. `None`: any default model is registered.
    fn has_model(&self, model_id: Option<&str>) -> bool;

    fn has_tool_with_prefix(&self, prefix: &str) -> bool;

    fn default_agent(&self, location: ChatLocation, mode: Option<ChatMode>) -> Option<AgentDescriptor>;

    fn agent(&self, id: &AgentId) -> Option<AgentDescriptor>;

    fn subscribe(&self) -> mpsc::UnboundedReceiver<ReadinessChange>;
}
