//! Readiness signals awaited before a request is resent.
//!
//! Each wait subscribes to the oracle before evaluating its predicate, so a
//! registration landing between the check and the subscription is not lost.

use std::fmt;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};

use cs_core::chat::{ChatLocation, ChatMode};
use cs_core::ports::{ReadinessChange, ReadinessOraclePort};

/// One of the registrations the real provider has to announce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReadinessSignal {
    Model,
    Tools,
    Agent,
}

impl fmt::Display for ReadinessSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReadinessSignal::Model => "model",
            ReadinessSignal::Tools => "tools",
            ReadinessSignal::Agent => "agent",
        };
        f.write_str(name)
    }
}

pub(crate) enum ReadinessWait {
    Ready,
    Pending(BoxFuture<'static, ()>),
}

type Predicate = Box<dyn Fn(&dyn ReadinessOraclePort) -> bool + Send + Sync>;

/// A readiness condition bound to the change kind that can flip it.
pub(crate) struct ReadinessCondition {
    pub(crate) signal: ReadinessSignal,
    relevant: ReadinessChange,
    predicate: Predicate,
}

impl ReadinessCondition {
    /// A specific model when the request names one, otherwise any default model.
    pub(crate) fn model(model_id: Option<String>) -> Self {
        Self {
            signal: ReadinessSignal::Model,
            relevant: ReadinessChange::ModelsChanged,
            predicate: Box::new(move |oracle| oracle.has_model(model_id.as_deref())),
        }
    }

    pub(crate) fn tools(prefix: String) -> Self {
        Self {
            signal: ReadinessSignal::Tools,
            relevant: ReadinessChange::ToolsChanged,
            predicate: Box::new(move |oracle| oracle.has_tool_with_prefix(&prefix)),
        }
    }

    /// A non-placeholder default agent for the surface and mode.
    pub(crate) fn agent(location: ChatLocation, mode: Option<ChatMode>) -> Self {
        Self {
            signal: ReadinessSignal::Agent,
            relevant: ReadinessChange::AgentsChanged,
            predicate: Box::new(move |oracle| {
                oracle
                    .default_agent(location, mode)
                    .is_some_and(|agent| !agent.is_placeholder)
            }),
        }
    }

    pub(crate) fn is_met(&self, oracle: &dyn ReadinessOraclePort) -> bool {
        (self.predicate)(oracle)
    }

    pub(crate) fn wait(self, oracle: Arc<dyn ReadinessOraclePort>) -> ReadinessWait {
        let mut changes = oracle.subscribe();
        if self.is_met(oracle.as_ref()) {
            return ReadinessWait::Ready;
        }

        ReadinessWait::Pending(
            async move {
                while let Some(change) = changes.recv().await {
                    if change == self.relevant && self.is_met(oracle.as_ref()) {
                        return;
                    }
                }
                // Oracle gone: only the deadline can end the race now.
                future::pending::<()>().await
            }
            .boxed(),
        )
    }
}
