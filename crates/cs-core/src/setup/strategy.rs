use serde::{Deserialize, Serialize};

use crate::settings::model::{AuthProviderKind, SocialProvider};

/// Provisioning path chosen once per run.
///
/// 每次运行选定一次的供应路径。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SetupStrategy {
    /// Dialog dismissed or "skip for now".
    Canceled,
    /// Already-entitled users: no identity choice needed.
    DefaultSetup,
    SetupWithoutEnterpriseProvider,
    SetupWithEnterpriseProvider,
    SetupWithGoogleProvider,
    SetupWithAppleProvider,
}

/// Progress of the setup controller.
///
/// `Initial → SigningIn → Installing → Initial`; always returns to `Initial`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SetupStep {
    #[default]
    Initial,
    SigningIn,
    Installing,
}

/// Tri-state outcome of a setup run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SetupOutcome {
    Succeeded,
    Failed,
    /// The user backed out (dismissed, skipped, denied trust, failed sign-in).
    /// No further error is shown for this outcome.
    Cancelled,
}

impl SetupOutcome {
    pub fn from_success(success: bool) -> Self {
        if success {
            SetupOutcome::Succeeded
        } else {
            SetupOutcome::Failed
        }
    }
}

/// Result reported to every caller of a setup run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupResult {
    pub outcome: SetupOutcome,
    /// The strategy dialog was bypassed by a one-shot skip request.
    pub dialog_skipped: bool,
}

/// Options accepted by the setup runner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupOptions {
    pub force_sign_in_dialog: bool,
    pub disable_chat_view_reveal: bool,
    pub additional_scopes: Vec<String>,
}

/// Options accepted by the setup controller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupRequest {
    pub force_sign_in: bool,
    pub use_enterprise_provider: bool,
    pub social_provider: Option<SocialProvider>,
    pub additional_scopes: Vec<String>,
}

impl SetupRequest {
    pub fn with_provider(use_enterprise_provider: bool, social_provider: Option<SocialProvider>) -> Self {
        Self {
            use_enterprise_provider,
            social_provider,
            ..Self::default()
        }
    }

    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.additional_scopes = scopes;
        self
    }

    /// Identity backend to sign in with, given the configured one.
    pub fn auth_provider(&self, configured: AuthProviderKind) -> AuthProviderKind {
        if self.use_enterprise_provider {
            AuthProviderKind::Enterprise
        } else {
            configured
        }
    }
}
