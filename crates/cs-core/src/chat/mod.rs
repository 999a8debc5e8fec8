//! Chat request domain module.
//!
//! Requests as they arrive at the placeholder agent, and the rewrite that
//! retargets them at the real provider.

mod request;
pub mod rewrite;

pub use request::{
    AgentDescriptor, ChatLocation, ChatMessage, ChatMode, ChatRequest, ModeSelection,
    OffsetRange, RequestPart, ResendOptions, VariableEntry, VariableKind,
};
pub use rewrite::{provider_agent_id, provider_tool_id, rewrite_request};
