use std::sync::Arc;

use tracing::{debug, info};

use cs_core::ports::{DialogPort, SettingsPort};
use cs_core::provisioning::ProvisioningState;
use cs_core::setup::{SetupStrategy, StrategyPrompt};

use super::load_settings_or_default;

/// Presents exactly one modal choice per invocation.
///
/// Does not mutate the provisioning context.
pub struct StrategyDialog {
    dialog: Arc<dyn DialogPort>,
    settings: Arc<dyn SettingsPort>,
}

impl StrategyDialog {
    pub fn new(dialog: Arc<dyn DialogPort>, settings: Arc<dyn SettingsPort>) -> Self {
        Self { dialog, settings }
    }

    pub async fn show(&self, state: &ProvisioningState, force_sign_in_dialog: bool) -> SetupStrategy {
        let settings = load_settings_or_default(self.settings.as_ref()).await;
        let prompt = StrategyPrompt::build(state.entitlement, force_sign_in_dialog, &settings);
        debug!(
            buttons = prompt.buttons.len(),
            entitlement = ?state.entitlement,
            "showing setup strategy dialog"
        );

        let choice = self.dialog.choose(&prompt).await;
        let strategy = prompt.strategy_for(choice);
        info!(?choice, ?strategy, "setup strategy chosen");
        strategy
    }
}
