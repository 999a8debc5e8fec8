//! Identity backend port
//!
//! Sign-in is an opaque remote call. The backend surfaces its own error UI,
//! callers only see success, "no session" or an error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::provisioning::Entitlement;
use crate::settings::model::{AuthProviderKind, SocialProvider};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub id: String,
    pub account: String,
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInRequest {
    pub provider: AuthProviderKind,
    pub social_provider: Option<SocialProvider>,
    pub additional_scopes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInResult {
    pub session: Option<AuthSession>,
    /// Entitlement resolved as part of signing in, if any.
    pub entitlement: Option<Entitlement>,
}

#[async_trait]
pub trait IdentityPort: Send + Sync {
    async fn sign_in(&self, request: SignInRequest) -> anyhow::Result<SignInResult>;

    /// Existing sessions of the given backend.
    async fn sessions(&self, provider: AuthProviderKind) -> anyhow::Result<Vec<AuthSession>>;
}
