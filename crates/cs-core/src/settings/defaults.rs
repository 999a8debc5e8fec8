use super::model::*;

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            auth_provider: AuthProviderKind::Default,
            enterprise_uri: None,
            sign_in_dialog_variant: SignInDialogVariant::Default,
        }
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            package_id: "realprovider.chat".to_string(),
            pre_release: false,
            default_backend_name: "GitHub".to_string(),
            enterprise_backend_name: "GHE.com".to_string(),
        }
    }
}

impl Default for ProviderNaming {
    fn default() -> Self {
        Self {
            placeholder_agent_namespace: "placeholder".to_string(),
            provider_agent_namespace: "realprovider".to_string(),
            placeholder_tool_prefix: "placeholder.tools.".to_string(),
            provider_tool_prefix: "realProvider_".to_string(),
        }
    }
}

impl Default for ForwardingSettings {
    fn default() -> Self {
        Self {
            ready_timeout_secs: 20,
            remote_ready_timeout_secs: 60, // remote extension hosts start slower
            almost_ready_notice_secs: 10,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            identity: IdentitySettings::default(),
            provider: ProviderSettings::default(),
            naming: ProviderNaming::default(),
            forwarding: ForwardingSettings::default(),
        }
    }
}
