//! Placeholder agent.
//!
//! Stands in for the real chat provider until it is provisioned, then waits
//! for the provider to register and resends the original request to it.
//!
//! 占位代理：在真实提供方就绪之前代为接收请求，就绪后转发原始请求。

mod agent;
mod readiness;

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use cs_core::chat::{ChatLocation, ChatMode};
use cs_core::ids::SessionId;
use cs_core::settings::model::{ForwardingSettings, ProviderNaming};

pub use agent::PlaceholderAgent;
pub use readiness::ReadinessSignal;

/// Timing and naming used while forwarding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardingConfig {
    pub ready_timeout: Duration,
    pub almost_ready_notice: Duration,
    pub naming: ProviderNaming,
}

impl ForwardingConfig {
    /// `remote` selects the longer timeout used over remote connections.
    pub fn from_settings(forwarding: &ForwardingSettings, naming: &ProviderNaming, remote: bool) -> Self {
        let ready_timeout_secs = if remote {
            forwarding.remote_ready_timeout_secs
        } else {
            forwarding.ready_timeout_secs
        };
        Self {
            ready_timeout: Duration::from_secs(ready_timeout_secs),
            almost_ready_notice: Duration::from_secs(forwarding.almost_ready_notice_secs),
            naming: naming.clone(),
        }
    }
}

/// Why the real provider could not take over a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadinessFailure {
    #[error("timed out waiting for {}", join_signals(.pending))]
    TimedOut { pending: Vec<ReadinessSignal> },

    #[error("default agent failed to activate: {reason}")]
    ActivationFailed { reason: String },
}

fn join_signals(signals: &[ReadinessSignal]) -> String {
    signals
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardOutcome {
    Resent,
    /// The readiness race was lost; a warning and an unresolvable
    /// notification have been emitted.
    Unresolved(ReadinessFailure),
}

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("a request is already being forwarded for session {0}")]
    AlreadyInProgress(SessionId),

    #[error("failed to resend request: {0:#}")]
    Resend(anyhow::Error),
}

/// Published when the placeholder gives up on a request, so the surrounding
/// registration can hand the surface to the provider's own UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvableError {
    pub location: ChatLocation,
    pub mode: Option<ChatMode>,
    pub reason: ReadinessFailure,
}

impl fmt::Display for UnresolvableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chat provider unresolvable in {:?}", self.location)?;
        if let Some(mode) = self.mode {
            write!(f, " ({mode:?} mode)")?;
        }
        write!(f, ": {}", self.reason)
    }
}

impl std::error::Error for UnresolvableError {}

/// What a single invocation ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvokeOutcome {
    Forwarded(ForwardOutcome),
    /// Setup ran without the dialog; the transcript was cleared instead of resending.
    TranscriptCleared,
    SetupFailed,
    SetupCancelled,
    ForwardFailed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_connections_use_the_longer_timeout() {
        let forwarding = ForwardingSettings::default();
        let naming = ProviderNaming::default();

        let local = ForwardingConfig::from_settings(&forwarding, &naming, false);
        let remote = ForwardingConfig::from_settings(&forwarding, &naming, true);

        assert_eq!(local.ready_timeout, Duration::from_secs(20));
        assert_eq!(remote.ready_timeout, Duration::from_secs(60));
        assert_eq!(local.almost_ready_notice, Duration::from_secs(10));
    }

    #[test]
    fn timeout_failure_names_pending_signals() {
        let failure = ReadinessFailure::TimedOut {
            pending: vec![ReadinessSignal::Model, ReadinessSignal::Agent],
        };

        assert_eq!(failure.to_string(), "timed out waiting for model, agent");
    }
}
