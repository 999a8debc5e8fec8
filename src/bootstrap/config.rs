//! # Configuration Loader / 配置加载器
//!
//! Reads the host TOML file into [`AppConfig`]. Pure data loading: missing
//! sections become `None`, nothing is validated here.
//!
//! ```toml
//! [settings]
//! path = "/home/me/.config/chat-setup/settings.json"
//!
//! [remote]
//! authority = "ssh-remote+devbox"
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;

/// Host configuration DTO.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Settings file location; `None` means the platform default.
    pub settings_path: Option<PathBuf>,
    /// Remote connection authority, present when running against a remote host.
    pub remote_authority: Option<String>,
}

impl AppConfig {
    /// Map a parsed TOML document to the DTO.
    ///
    /// 非字符串或缺失的字段视为 `None`。
    pub fn from_toml(value: &toml::Value) -> anyhow::Result<Self> {
        let string_at = |section: &str, key: &str| {
            value
                .get(section)
                .and_then(|table| table.get(key))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };

        Ok(Self {
            settings_path: string_at("settings", "path").map(PathBuf::from),
            remote_authority: string_at("remote", "authority"),
        })
    }

    pub fn is_remote(&self) -> bool {
        self.remote_authority.is_some()
    }
}

/// Load configuration from a TOML file
/// 从 TOML 文件加载配置
///
/// # Errors / 错误
///
/// Returns error if the file cannot be read or is not valid TOML.
pub fn load_app_config(config_path: impl AsRef<Path>) -> anyhow::Result<AppConfig> {
    let config_path = config_path.as_ref();
    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    AppConfig::from_toml(&toml_value)
}
