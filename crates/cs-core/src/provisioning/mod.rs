//! Provisioning domain module.
//!
//! Describes whether the chat provider is installed, usable and entitled.

mod state;

pub use state::{Entitlement, ProvisioningChange, ProvisioningPatch, ProvisioningState};
