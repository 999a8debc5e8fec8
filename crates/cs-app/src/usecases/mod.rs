//! Setup use cases
//!
//! ```text
//! chat request
//!      ↓
//! PlaceholderAgent ── ready ──────────────────────────┐
//!      ↓ not ready                                    │
//! SetupRunner (one pending run per window)            │
//!      ↓                                              │
//! StrategyDialog → SetupController (sign-in/install)  │
//!      ↓                                              ↓
//! readiness race → rewrite → resend to the real provider
//! ```

pub mod placeholder;
pub mod provisioning_context;
pub mod setup;

pub use placeholder::{
    ForwardError, ForwardOutcome, ForwardingConfig, InvokeOutcome, PlaceholderAgent,
    ReadinessFailure, ReadinessSignal, UnresolvableError,
};
pub use provisioning_context::{ProvisioningContext, SuspendGuard};
pub use setup::{SetupController, SetupRunError, SetupRunner, StrategyDialog, TRUST_REQUEST_MESSAGE};
