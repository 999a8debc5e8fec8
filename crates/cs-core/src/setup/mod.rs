//! Setup domain module.
//!
//! This module defines the provisioning strategy types, the strategy prompt
//! and enterprise instance resolution.

pub mod enterprise;
pub mod prompt;
mod strategy;

pub use enterprise::{
    is_valid_enterprise_uri, resolve_enterprise_uri, validate_enterprise_input,
    EnterpriseUriError, InputFeedback,
};
pub use prompt::{ButtonStyle, PromptButton, StrategyPrompt};
pub use strategy::{SetupOptions, SetupOutcome, SetupRequest, SetupResult, SetupStep, SetupStrategy};
