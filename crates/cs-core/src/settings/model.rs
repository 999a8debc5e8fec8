use serde::{Deserialize, Serialize};

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Which identity backend the provider signs in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthProviderKind {
    #[default]
    Default,
    Enterprise,
}

/// Social identities offered as alternatives to the default backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialProvider {
    Google,
    Apple,
}

/// Preferred variant of the sign-in dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignInDialogVariant {
    /// Offer the Google identity next to the default and enterprise backends.
    #[default]
    Default,
    /// Additionally offer the Apple identity.
    Apple,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySettings {
    pub auth_provider: AuthProviderKind,
    /// Enterprise instance, e.g. `https://octocat.ghe.com`.
    pub enterprise_uri: Option<String>,
    #[serde(default)]
    pub sign_in_dialog_variant: SignInDialogVariant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Package installed to provide the real chat agent.
    pub package_id: String,
    pub pre_release: bool,
    /// Display name of the default identity backend.
    pub default_backend_name: String,
    /// Display name of the enterprise identity backend.
    pub enterprise_backend_name: String,
}

/// Identifier namespaces used to map placeholder references onto the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderNaming {
    /// Agent namespace of the placeholder, e.g. `placeholder` in `placeholder.chat`.
    pub placeholder_agent_namespace: String,
    /// Agent namespace of the real provider.
    pub provider_agent_namespace: String,
    /// Tool id prefix of the placeholder tools, e.g. `placeholder.tools.`.
    pub placeholder_tool_prefix: String,
    /// Tool id prefix of the real provider tools, e.g. `realProvider_`.
    pub provider_tool_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardingSettings {
    pub ready_timeout_secs: u64,
    /// Used instead of `ready_timeout_secs` over a remote connection.
    pub remote_ready_timeout_secs: u64,
    /// Delay before the "almost ready" progress message.
    pub almost_ready_notice_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub schema_version: u32,
    pub identity: IdentitySettings,
    pub provider: ProviderSettings,
    pub naming: ProviderNaming,
    #[serde(default)]
    pub forwarding: ForwardingSettings,
}

impl Settings {
    /// Display name of the configured identity backend.
    pub fn backend_name(&self) -> &str {
        self.backend_name_for(self.identity.auth_provider)
    }

    pub fn backend_name_for(&self, provider: AuthProviderKind) -> &str {
        match provider {
            AuthProviderKind::Default => &self.provider.default_backend_name,
            AuthProviderKind::Enterprise => &self.provider.enterprise_backend_name,
        }
    }
}
