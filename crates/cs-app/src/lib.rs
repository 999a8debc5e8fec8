//! Chat setup orchestration layer
//!
//! This crate contains the setup use cases: the shared provisioning context,
//! the strategy dialog, the setup controller and runner, and the placeholder
//! agent that forwards requests once the real provider is ready.

pub mod deps;
pub mod runtime;
pub mod usecases;

pub use deps::AppDeps;
pub use runtime::SetupRuntime;
