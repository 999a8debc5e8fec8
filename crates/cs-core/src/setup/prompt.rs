//! Strategy prompt.
//!
//! Pure construction of the setup dialog's button set. Rendering is left to the
//! dialog port; this only decides which choices exist, their order and which one
//! is primary.

use serde::{Deserialize, Serialize};

use crate::provisioning::Entitlement;
use crate::settings::model::{AuthProviderKind, Settings, SignInDialogVariant};
use crate::setup::SetupStrategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonStyle {
    Primary,
    Secondary,
    Link,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptButton {
    pub label: String,
    pub strategy: SetupStrategy,
    pub style: ButtonStyle,
}

impl PromptButton {
    fn new(label: impl Into<String>, strategy: SetupStrategy, style: ButtonStyle) -> Self {
        Self {
            label: label.into(),
            strategy,
            style,
        }
    }
}

/// Modal choice shown once per setup run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyPrompt {
    pub title: String,
    pub buttons: Vec<PromptButton>,
}

impl StrategyPrompt {
    /// Builds the prompt.
    ///
    /// Identity choices are offered when the entitlement is unknown or sign-in is
    /// forced; otherwise a single "set up" action. A non-primary skip action is
    /// always appended.
    pub fn build(entitlement: Entitlement, force_sign_in: bool, settings: &Settings) -> Self {
        let mut buttons = if entitlement == Entitlement::Unknown || force_sign_in {
            Self::identity_buttons(settings)
        } else {
            vec![PromptButton::new(
                "Set up AI features",
                SetupStrategy::DefaultSetup,
                ButtonStyle::Primary,
            )]
        };

        buttons.push(PromptButton::new(
            "Skip for now",
            SetupStrategy::Canceled,
            ButtonStyle::Link,
        ));

        Self {
            title: "Use AI features in chat".to_string(),
            buttons,
        }
    }

    fn identity_buttons(settings: &Settings) -> Vec<PromptButton> {
        let provider = &settings.provider;
        let default_label = format!("Continue with {}", provider.default_backend_name);
        let enterprise_label = format!("Continue with {}", provider.enterprise_backend_name);

        // The configured backend leads as the primary action, the other one trails as a link.
        let (first, last) = match settings.identity.auth_provider {
            AuthProviderKind::Default => (
                PromptButton::new(
                    default_label,
                    SetupStrategy::SetupWithoutEnterpriseProvider,
                    ButtonStyle::Primary,
                ),
                PromptButton::new(
                    enterprise_label,
                    SetupStrategy::SetupWithEnterpriseProvider,
                    ButtonStyle::Link,
                ),
            ),
            AuthProviderKind::Enterprise => (
                PromptButton::new(
                    enterprise_label,
                    SetupStrategy::SetupWithEnterpriseProvider,
                    ButtonStyle::Primary,
                ),
                PromptButton::new(
                    default_label,
                    SetupStrategy::SetupWithoutEnterpriseProvider,
                    ButtonStyle::Link,
                ),
            ),
        };

        let mut buttons = vec![
            first,
            PromptButton::new(
                "Continue with Google",
                SetupStrategy::SetupWithGoogleProvider,
                ButtonStyle::Secondary,
            ),
        ];
        if settings.identity.sign_in_dialog_variant == SignInDialogVariant::Apple {
            buttons.push(PromptButton::new(
                "Continue with Apple",
                SetupStrategy::SetupWithAppleProvider,
                ButtonStyle::Secondary,
            ));
        }
        buttons.push(last);
        buttons
    }

    /// Maps the chosen button index to a strategy; dismissal is `Canceled`.
    pub fn strategy_for(&self, choice: Option<usize>) -> SetupStrategy {
        choice
            .and_then(|index| self.buttons.get(index))
            .map(|button| button.strategy)
            .unwrap_or(SetupStrategy::Canceled)
    }

    pub fn offers(&self, strategy: SetupStrategy) -> bool {
        self.buttons.iter().any(|button| button.strategy == strategy)
    }

    pub fn primary(&self) -> Option<&PromptButton> {
        self.buttons
            .iter()
            .find(|button| button.style == ButtonStyle::Primary)
    }
}
