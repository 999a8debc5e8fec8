//! Port interfaces for the application layer
//!
//! Ports define the contract between the setup use cases and the collaborators
//! of the surrounding workbench: identity, installation and entitlement
//! backends, dialogs, the chat transcript and the readiness registry. This
//! follows Hexagonal Architecture principles, keeping the orchestration logic
//! independent of any concrete editor.

pub mod chat;
pub mod dialog;
pub mod entitlement;
pub mod identity;
pub mod installer;
pub mod readiness;
pub mod settings;
pub mod workspace_trust;

pub use chat::{ActivationFailure, ChatServicePort, ChatTranscriptPort};
pub use dialog::{ConfirmRequest, ConfirmResult, DialogPort, InputRequest, InputValidator};
pub use entitlement::{EntitlementPort, SignUpError};
pub use identity::{AuthSession, IdentityPort, SignInRequest, SignInResult};
pub use installer::{InstallOptions, InstallerPort};
pub use readiness::{ReadinessChange, ReadinessOraclePort};
pub use settings::SettingsPort;
pub use workspace_trust::WorkspaceTrustPort;
