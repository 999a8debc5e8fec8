mod file_repo;

use std::path::PathBuf;

pub use file_repo::{FileSettingsRepository, SettingsError};

const APP_DIR: &str = "chat-setup";
const SETTINGS_FILE: &str = "settings.json";

/// `<config dir>/chat-setup/settings.json`, when the platform has a config dir.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
}
