//! # Application Dependencies
//!
//! This module defines the dependency grouping for runtime construction.
//!
//! **Note**: This is NOT a Builder pattern.
//! - No build steps
//! - No default values
//! - Just parameter grouping

use std::sync::Arc;
use cs_core::ports::*;

/// Setup dependency grouping (non-Builder, just parameter grouping)
///
/// All dependencies are required - no defaults, no optional fields.
#[derive(Clone)]
pub struct AppDeps {
    // Configuration
    pub settings: Arc<dyn SettingsPort>,

    // Remote backends
    pub identity: Arc<dyn IdentityPort>,
    pub installer: Arc<dyn InstallerPort>,
    pub entitlement: Arc<dyn EntitlementPort>,

    // UI
    pub dialog: Arc<dyn DialogPort>,
    pub workspace_trust: Arc<dyn WorkspaceTrustPort>,

    // Chat
    pub transcript: Arc<dyn ChatTranscriptPort>,
    pub chat_service: Arc<dyn ChatServicePort>,
    pub readiness: Arc<dyn ReadinessOraclePort>,
}
