//! In-memory readiness registry.
//!
//! The workbench feeds model, tool and agent registrations into this registry
//! as providers come and go; the placeholder agent reads it through
//! [`ReadinessOraclePort`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use tokio::sync::mpsc;
use tracing::debug;

use cs_core::chat::{AgentDescriptor, ChatLocation, ChatMode};
use cs_core::ids::{AgentId, ToolId};
use cs_core::ports::{ReadinessChange, ReadinessOraclePort};

/// An agent together with where it can serve requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRegistration {
    pub descriptor: AgentDescriptor,
    pub locations: Vec<ChatLocation>,
    /// Empty means every mode.
    pub modes: Vec<ChatMode>,
    pub is_default: bool,
}

impl AgentRegistration {
    fn serves(&self, location: ChatLocation, mode: Option<ChatMode>) -> bool {
        self.locations.contains(&location)
            && match mode {
                Some(mode) => self.modes.is_empty() || self.modes.contains(&mode),
                None => true,
            }
    }
}

#[derive(Default)]
struct Registrations {
    /// Model id → registered as a default model.
    models: BTreeMap<String, bool>,
    tools: BTreeSet<ToolId>,
    agents: Vec<AgentRegistration>,
}

#[derive(Default)]
pub struct InMemoryReadinessRegistry {
    registrations: Mutex<Registrations>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<ReadinessChange>>>,
}

impl InMemoryReadinessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_model(&self, model_id: impl Into<String>, is_default: bool) {
        self.lock_registrations()
            .models
            .insert(model_id.into(), is_default);
        self.notify(ReadinessChange::ModelsChanged);
    }

    pub fn unregister_model(&self, model_id: &str) {
        if self.lock_registrations().models.remove(model_id).is_some() {
            self.notify(ReadinessChange::ModelsChanged);
        }
    }

    pub fn register_tool(&self, tool_id: ToolId) {
        if self.lock_registrations().tools.insert(tool_id) {
            self.notify(ReadinessChange::ToolsChanged);
        }
    }

    pub fn unregister_tool(&self, tool_id: &ToolId) {
        if self.lock_registrations().tools.remove(tool_id) {
            self.notify(ReadinessChange::ToolsChanged);
        }
    }

    /// Replaces any registration with the same agent id.
    pub fn register_agent(&self, registration: AgentRegistration) {
        {
            let mut registrations = self.lock_registrations();
            registrations
                .agents
                .retain(|existing| existing.descriptor.id != registration.descriptor.id);
            registrations.agents.push(registration);
        }
        self.notify(ReadinessChange::AgentsChanged);
    }

    pub fn unregister_agent(&self, agent_id: &AgentId) {
        let removed = {
            let mut registrations = self.lock_registrations();
            let before = registrations.agents.len();
            registrations
                .agents
                .retain(|existing| &existing.descriptor.id != agent_id);
            registrations.agents.len() != before
        };
        if removed {
            self.notify(ReadinessChange::AgentsChanged);
        }
    }

    fn notify(&self, change: ReadinessChange) {
        debug!(?change, "readiness registrations changed");
        self.lock_subscribers()
            .retain(|subscriber| subscriber.send(change).is_ok());
    }

    fn lock_registrations(&self) -> MutexGuard<'_, Registrations> {
        self.registrations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_subscribers(&self) -> MutexGuard<'_, Vec<mpsc::UnboundedSender<ReadinessChange>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ReadinessOraclePort for InMemoryReadinessRegistry {
    fn has_model(&self, model_id: Option<&str>) -> bool {
        let registrations = self.lock_registrations();
        match model_id {
            Some(model_id) => registrations.models.contains_key(model_id),
            None => registrations.models.values().any(|is_default| *is_default),
        }
    }

    fn has_tool_with_prefix(&self, prefix: &str) -> bool {
        self.lock_registrations()
            .tools
            .iter()
            .any(|tool| tool.as_str().starts_with(prefix))
    }

    /// Provider agents win over placeholders registered for the same surface.
    fn default_agent(&self, location: ChatLocation, mode: Option<ChatMode>) -> Option<AgentDescriptor> {
        let registrations = self.lock_registrations();
        let candidates: Vec<&AgentRegistration> = registrations
            .agents
            .iter()
            .filter(|agent| agent.is_default && agent.serves(location, mode))
            .collect();

        candidates
            .iter()
            .find(|agent| !agent.descriptor.is_placeholder)
            .or_else(|| candidates.first())
            .map(|agent| agent.descriptor.clone())
    }

    fn agent(&self, id: &AgentId) -> Option<AgentDescriptor> {
        self.lock_registrations()
            .agents
            .iter()
            .find(|agent| &agent.descriptor.id == id)
            .map(|agent| agent.descriptor.clone())
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<ReadinessChange> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock_subscribers().push(tx);
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(id: &str, is_placeholder: bool) -> AgentRegistration {
        AgentRegistration {
            descriptor: AgentDescriptor {
                id: AgentId::new(id),
                name: "chat".to_string(),
                is_placeholder,
            },
            locations: vec![ChatLocation::Panel],
            modes: Vec::new(),
            is_default: true,
        }
    }

    #[test]
    fn default_model_query_ignores_non_default_models() {
        let registry = InMemoryReadinessRegistry::new();
        registry.register_model("embeddings", false);
        assert!(!registry.has_model(None));
        assert!(registry.has_model(Some("embeddings")));

        registry.register_model("model-large", true);
        assert!(registry.has_model(None));
    }

    #[test]
    fn tool_prefix_matching() {
        let registry = InMemoryReadinessRegistry::new();
        registry.register_tool(ToolId::new("realProvider_search"));

        assert!(registry.has_tool_with_prefix("realProvider_"));
        assert!(!registry.has_tool_with_prefix("placeholder.tools."));
    }

    #[test]
    fn tools_are_deduplicated_and_removable() {
        let registry = InMemoryReadinessRegistry::new();
        registry.register_tool(ToolId::new("realProvider_search"));
        registry.register_tool(ToolId::new("realProvider_search"));
        registry.unregister_tool(&ToolId::new("realProvider_search"));

        assert!(!registry.has_tool_with_prefix("realProvider_"));
    }

    #[test]
    fn provider_agent_is_preferred_over_placeholder() {
        let registry = InMemoryReadinessRegistry::new();
        registry.register_agent(registration("placeholder.chat", true));
        assert!(registry
            .default_agent(ChatLocation::Panel, None)
            .is_some_and(|agent| agent.is_placeholder));

        registry.register_agent(registration("realprovider.chat", false));
        let agent = registry.default_agent(ChatLocation::Panel, None).unwrap();
        assert_eq!(agent.id, AgentId::new("realprovider.chat"));
        assert!(registry.default_agent(ChatLocation::Terminal, None).is_none());
    }

    #[test]
    fn mode_restricted_agents_only_serve_their_modes() {
        let registry = InMemoryReadinessRegistry::new();
        let mut agent = registration("realprovider.edits", false);
        agent.modes = vec![ChatMode::Edit];
        registry.register_agent(agent);

        assert!(registry
            .default_agent(ChatLocation::Panel, Some(ChatMode::Edit))
            .is_some());
        assert!(registry
            .default_agent(ChatLocation::Panel, Some(ChatMode::Ask))
            .is_none());
    }

    #[test]
    fn subscribers_are_told_what_changed() {
        let registry = InMemoryReadinessRegistry::new();
        let mut changes = registry.subscribe();

        registry.register_model("model-large", true);
        registry.register_tool(ToolId::new("realProvider_search"));
        registry.register_agent(registration("realprovider.chat", false));
        registry.unregister_agent(&AgentId::new("unknown"));

        assert_eq!(changes.try_recv().unwrap(), ReadinessChange::ModelsChanged);
        assert_eq!(changes.try_recv().unwrap(), ReadinessChange::ToolsChanged);
        assert_eq!(changes.try_recv().unwrap(), ReadinessChange::AgentsChanged);
        assert!(changes.try_recv().is_err());
    }
}
