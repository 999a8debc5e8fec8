//! Infrastructure adapters: JSON settings storage and the in-memory readiness
//! registry the workbench feeds with provider registrations.

pub mod readiness;
pub mod settings;

pub use readiness::InMemoryReadinessRegistry;
pub use settings::{default_settings_path, FileSettingsRepository, SettingsError};
