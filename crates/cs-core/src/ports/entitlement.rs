use async_trait::async_trait;
use thiserror::Error;

use crate::ports::identity::AuthSession;
use crate::provisioning::Entitlement;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("free tier sign-up failed with status {status}")]
pub struct SignUpError {
    pub status: u16,
}

#[async_trait]
pub trait EntitlementPort: Send + Sync {
    /// Claims the free tier. `Ok(false)` means the identity was already signed up.
    async fn sign_up_free(&self, sessions: &[AuthSession]) -> Result<bool, SignUpError>;

    async fn force_resolve(&self, session: &AuthSession) -> anyhow::Result<Entitlement>;
}
