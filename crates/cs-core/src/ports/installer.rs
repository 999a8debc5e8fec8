use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOptions {
    pub enable: bool,
    /// Install into every profile.
    pub application_scoped: bool,
    /// Install on both local and remote hosts.
    pub install_everywhere: bool,
    pub pre_release: bool,
}

impl InstallOptions {
    pub fn everywhere(pre_release: bool) -> Self {
        Self {
            enable: true,
            application_scoped: true,
            install_everywhere: true,
            pre_release,
        }
    }
}

#[async_trait]
pub trait InstallerPort: Send + Sync {
    async fn install(&self, package_id: &str, options: InstallOptions) -> anyhow::Result<()>;

    /// Asks an already-running provider to mint fresh tokens.
    async fn refresh_tokens(&self) -> anyhow::Result<()>;
}
