//! Setup use cases.
//!
//! This module exposes the strategy dialog, the setup controller and the
//! deduplicating setup runner.

mod controller;
mod runner;
mod strategy_dialog;

pub use controller::SetupController;
pub use runner::{SetupRunError, SetupRunner};
pub use strategy_dialog::StrategyDialog;

use cs_core::ports::SettingsPort;
use cs_core::settings::model::Settings;
use tracing::warn;

pub const TRUST_REQUEST_MESSAGE: &str =
    "AI features are currently only supported in trusted workspaces.";

/// Loads settings, falling back to defaults when the store is unreadable.
pub(crate) async fn load_settings_or_default(settings: &dyn SettingsPort) -> Settings {
    match settings.load().await {
        Ok(settings) => settings,
        Err(err) => {
            warn!(error = %err, "failed to load settings, using defaults");
            Settings::default()
        }
    }
}
