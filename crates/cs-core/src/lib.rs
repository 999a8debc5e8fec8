//! # cs-core
//!
//! Core domain models and port contracts for provisioning a chat provider
//! behind a placeholder agent.
//!
//! This crate contains pure business logic without any infrastructure dependencies.

pub mod chat;
pub mod ids;
pub mod ports;
pub mod provisioning;
pub mod settings;
pub mod setup;

// Re-export commonly used types at the crate root
pub use chat::{AgentDescriptor, ChatLocation, ChatMode, ChatRequest, RequestPart};
pub use ids::{AgentId, RequestId, SessionId, ToolId};
pub use provisioning::{Entitlement, ProvisioningChange, ProvisioningPatch, ProvisioningState};
pub use settings::model::Settings;
pub use setup::{SetupOptions, SetupOutcome, SetupRequest, SetupResult, SetupStep, SetupStrategy};
