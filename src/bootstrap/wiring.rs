//! # Dependency Injection / 依赖注入模块
//!
//! Assembles the setup runtime from the infra adapters in `cs-infra` and the
//! workbench ports handed in by the host.
//!
//! > **This is the only place allowed to depend on cs-infra and cs-app simultaneously.**
//! > But this privilege is only for "assembly", not for "decision making".
//! > 但这种特权仅用于"组装"，不用于"决策"。

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use cs_app::usecases::{ForwardingConfig, PlaceholderAgent};
use cs_app::{AppDeps, SetupRuntime};
use cs_core::chat::{ChatLocation, ChatMode};
use cs_core::ports::*;
use cs_core::provisioning::ProvisioningState;
use cs_core::settings::model::Settings;
use cs_infra::{default_settings_path, FileSettingsRepository, InMemoryReadinessRegistry};

use super::config::AppConfig;

#[derive(Debug, Error)]
pub enum WiringError {
    #[error("no settings path configured and the platform has no config directory")]
    SettingsPathUnavailable,
}

pub type WiringResult<T> = Result<T, WiringError>;

/// Ports owned by the embedding workbench.
#[derive(Clone)]
pub struct WorkbenchPorts {
    pub identity: Arc<dyn IdentityPort>,
    pub installer: Arc<dyn InstallerPort>,
    pub entitlement: Arc<dyn EntitlementPort>,
    pub dialog: Arc<dyn DialogPort>,
    pub workspace_trust: Arc<dyn WorkspaceTrustPort>,
    pub transcript: Arc<dyn ChatTranscriptPort>,
    pub chat_service: Arc<dyn ChatServicePort>,
}

/// Wired setup runtime plus the adapters the host keeps talking to.
pub struct ChatSetup {
    runtime: SetupRuntime,
    settings: Arc<FileSettingsRepository>,
    readiness: Arc<InMemoryReadinessRegistry>,
    remote: bool,
}

impl ChatSetup {
    pub fn runtime(&self) -> &SetupRuntime {
        &self.runtime
    }

    pub fn settings(&self) -> &Arc<FileSettingsRepository> {
        &self.settings
    }

    /// Provider contributions (models, tools, agents) are registered here.
    pub fn readiness(&self) -> &Arc<InMemoryReadinessRegistry> {
        &self.readiness
    }

    /// Placeholder agent for one chat surface, configured from current settings.
    pub async fn placeholder_agent(
        &self,
        location: ChatLocation,
        mode: Option<ChatMode>,
    ) -> PlaceholderAgent {
        let settings = match self.settings.load().await {
            Ok(settings) => settings,
            Err(err) => {
                warn!(error = %err, "failed to load settings, forwarding with defaults");
                Settings::default()
            }
        };
        let config =
            ForwardingConfig::from_settings(&settings.forwarding, &settings.naming, self.remote);
        self.runtime.placeholder_agent(location, mode, config)
    }
}

fn resolve_settings_path(config: &AppConfig) -> WiringResult<PathBuf> {
    config
        .settings_path
        .clone()
        .or_else(default_settings_path)
        .ok_or(WiringError::SettingsPathUnavailable)
}

/// Build the setup runtime.
///
/// `initial` is the provisioning state the host observed at startup.
pub fn wire_setup(
    config: &AppConfig,
    ports: WorkbenchPorts,
    initial: ProvisioningState,
) -> WiringResult<ChatSetup> {
    let settings_path = resolve_settings_path(config)?;
    info!(
        settings = %settings_path.display(),
        remote = config.is_remote(),
        "wiring chat setup"
    );

    let settings = Arc::new(FileSettingsRepository::new(settings_path));
    let readiness = Arc::new(InMemoryReadinessRegistry::new());

    let deps = AppDeps {
        settings: settings.clone(),
        identity: ports.identity,
        installer: ports.installer,
        entitlement: ports.entitlement,
        dialog: ports.dialog,
        workspace_trust: ports.workspace_trust,
        transcript: ports.transcript,
        chat_service: ports.chat_service,
        readiness: readiness.clone(),
    };

    Ok(ChatSetup {
        runtime: SetupRuntime::from_deps(deps, initial),
        settings,
        readiness,
        remote: config.is_remote(),
    })
}
