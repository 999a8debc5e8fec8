//! Setup controller.
//!
//! Drives one provisioning attempt: sign in, claim the free tier, install the
//! provider. All context mutations of a run are aggregated into a single
//! change by suspending the [`ProvisioningContext`] for the duration of the run.
//!
//! 设置控制器：登录、领取免费额度、安装提供方。

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use tracing::{debug, error, info, info_span, warn, Instrument};

use cs_core::ports::{
    AuthSession, ConfirmRequest, DialogPort, EntitlementPort, IdentityPort, InputRequest,
    InstallOptions, InstallerPort, SettingsPort, SignInRequest, SignInResult, WorkspaceTrustPort,
};
use cs_core::provisioning::{Entitlement, ProvisioningPatch};
use cs_core::settings::model::{AuthProviderKind, Settings};
use cs_core::setup::{
    is_valid_enterprise_uri, resolve_enterprise_uri, validate_enterprise_input, SetupOutcome,
    SetupRequest, SetupStep,
};

use super::{load_settings_or_default, TRUST_REQUEST_MESSAGE};
use crate::deps::AppDeps;
use crate::usecases::provisioning_context::{ProvisioningContext, SuspendGuard};

const SIGN_IN_REQUIRED_DETAIL: &str = "You must be signed in to use AI features.";
const INSTALL_RETRY_MESSAGE: &str =
    "An error occurred while setting up chat. Would you like to try again?";

struct SignedIn {
    session: AuthSession,
    entitlement: Option<Entitlement>,
}

pub struct SetupController {
    context: Arc<ProvisioningContext>,
    settings: Arc<dyn SettingsPort>,
    identity: Arc<dyn IdentityPort>,
    installer: Arc<dyn InstallerPort>,
    entitlement: Arc<dyn EntitlementPort>,
    dialog: Arc<dyn DialogPort>,
    workspace_trust: Arc<dyn WorkspaceTrustPort>,
    step: Mutex<SetupStep>,
    step_subscribers: Mutex<Vec<mpsc::UnboundedSender<SetupStep>>>,
}

impl SetupController {
    pub fn new(context: Arc<ProvisioningContext>, deps: &AppDeps) -> Self {
        Self {
            context,
            settings: Arc::clone(&deps.settings),
            identity: Arc::clone(&deps.identity),
            installer: Arc::clone(&deps.installer),
            entitlement: Arc::clone(&deps.entitlement),
            dialog: Arc::clone(&deps.dialog),
            workspace_trust: Arc::clone(&deps.workspace_trust),
            step: Mutex::new(SetupStep::Initial),
            step_subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn step(&self) -> SetupStep {
        *self.step.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Receives every step transition from now on.
    pub fn subscribe_steps(&self) -> mpsc::UnboundedReceiver<SetupStep> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock_subscribers().push(tx);
        rx
    }

    fn set_step(&self, step: SetupStep) {
        {
            let mut current = self.step.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if *current == step {
                return;
            }
            *current = step;
        }
        debug!(?step, "setup step changed");
        self.lock_subscribers()
            .retain(|subscriber| subscriber.send(step).is_ok());
    }

    fn lock_subscribers(&self) -> MutexGuard<'_, Vec<mpsc::UnboundedSender<SetupStep>>> {
        self.step_subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub async fn setup(&self, request: SetupRequest) -> SetupOutcome {
        let span = info_span!(
            "usecase.setup_controller.setup",
            force_sign_in = request.force_sign_in,
            enterprise = request.use_enterprise_provider,
        );

        async {
            let _run = SetupRunGuard {
                controller: self,
                _suspended: self.context.suspend_guard(),
            };
            let outcome = self.run_setup(&request).await;
            info!(?outcome, "setup finished");
            outcome
        }
        .instrument(span)
        .await
    }

    async fn run_setup(&self, request: &SetupRequest) -> SetupOutcome {
        let settings = load_settings_or_default(self.settings.as_ref()).await;
        let provider = request.auth_provider(settings.identity.auth_provider);

        let mut session = None;
        let mut resolved = None;
        if self.context.snapshot().entitlement == Entitlement::Unknown || request.force_sign_in {
            self.set_step(SetupStep::SigningIn);
            let Some(signed_in) = self.sign_in(request, provider, &settings).await else {
                // The provider still gets installed so it can keep prompting for sign-in.
                self.install_in_background(&settings);
                info!(?provider, "sign-in abandoned, setup cancelled");
                return SetupOutcome::Cancelled;
            };
            if let Some(entitlement) = signed_in.entitlement {
                self.context.update(ProvisioningPatch::entitlement(entitlement));
            }
            resolved = signed_in.entitlement;
            session = Some(signed_in.session);
        }

        if !self.workspace_trust.request_trust(TRUST_REQUEST_MESSAGE).await {
            info!("workspace trust denied during setup, setup postponed");
            self.context
                .update(ProvisioningPatch::later(true).with_untrusted(true));
            return SetupOutcome::Cancelled;
        }

        self.set_step(SetupStep::Installing);
        let entitlement = resolved.unwrap_or_else(|| self.context.snapshot().entitlement);
        let installed = self
            .install(session.as_ref(), entitlement, provider, &settings)
            .await;
        SetupOutcome::from_success(installed)
    }

    /// Signs in, offering a retry after each failed attempt.
    async fn sign_in(
        &self,
        request: &SetupRequest,
        provider: AuthProviderKind,
        settings: &Settings,
    ) -> Option<SignedIn> {
        loop {
            let attempt = self
                .identity
                .sign_in(SignInRequest {
                    provider,
                    social_provider: request.social_provider,
                    additional_scopes: request.additional_scopes.clone(),
                })
                .await;

            match attempt {
                Ok(SignInResult {
                    session: Some(session),
                    entitlement,
                }) => return Some(SignedIn { session, entitlement }),
                Ok(SignInResult { session: None, .. }) => {
                    warn!(?provider, "sign-in returned no session");
                }
                Err(err) => {
                    error!(error = %err, ?provider, "sign-in failed");
                }
            }

            let retry = self
                .dialog
                .confirm(ConfirmRequest::retry(
                    format!(
                        "Failed to sign in to {}. Would you like to try again?",
                        settings.backend_name_for(provider)
                    ),
                    Some(SIGN_IN_REQUIRED_DETAIL.to_string()),
                ))
                .await;
            if !retry.confirmed {
                return None;
            }
            debug!(?provider, "retrying sign-in");
        }
    }

    /// Claims the free tier when needed, then installs the provider.
    ///
    /// Returns `false` when no session could be found for a free sign-up or
    /// when installation failed and the user declined to retry.
    pub async fn install(
        &self,
        session: Option<&AuthSession>,
        entitlement: Entitlement,
        provider: AuthProviderKind,
        settings: &Settings,
    ) -> bool {
        let was_running = self.context.snapshot().is_running();

        if entitlement.needs_free_sign_up() {
            let sessions = match session {
                Some(session) => vec![session.clone()],
                None => self.identity.sessions(provider).await.unwrap_or_else(|err| {
                    warn!(error = %err, ?provider, "failed to list sessions");
                    Vec::new()
                }),
            };
            if sessions.is_empty() {
                warn!(?provider, "no session available to claim the free tier");
                return false;
            }
            self.sign_up_free(&sessions).await;
        }

        if let Err(err) = self.install_with_retry(settings).await {
            error!(error = %err, package = %settings.provider.package_id, "provider installation failed");
            return false;
        }
        self.context
            .update(ProvisioningPatch::installed(true).with_disabled(false));
        info!(package = %settings.provider.package_id, was_running, "provider installed");

        if was_running {
            if let Err(err) = self.installer.refresh_tokens().await {
                warn!(error = %err, "failed to refresh provider tokens");
            }
        }
        true
    }

    /// A failed sign-up is recorded and installation proceeds anyway.
    async fn sign_up_free(&self, sessions: &[AuthSession]) {
        match self.entitlement.sign_up_free(sessions).await {
            Ok(true) => {
                let Some(session) = sessions.first() else {
                    return;
                };
                match self.entitlement.force_resolve(session).await {
                    Ok(entitlement) => {
                        info!(?entitlement, "free tier claimed");
                        self.context.update(ProvisioningPatch::entitlement(entitlement));
                    }
                    Err(err) => warn!(error = %err, "failed to resolve entitlement after sign-up"),
                }
            }
            Ok(false) => debug!("free tier already claimed"),
            Err(err) => warn!(status = err.status, "free tier sign-up failed"),
        }
    }

    async fn install_with_retry(&self, settings: &Settings) -> anyhow::Result<()> {
        let options = InstallOptions::everywhere(settings.provider.pre_release);
        loop {
            let err = match self
                .installer
                .install(&settings.provider.package_id, options.clone())
                .await
            {
                Ok(()) => return Ok(()),
                Err(err) => err,
            };
            warn!(error = %err, "provider installation attempt failed");

            let retry = self
                .dialog
                .confirm(ConfirmRequest::retry(INSTALL_RETRY_MESSAGE, Some(err.to_string())))
                .await;
            if !retry.confirmed {
                return Err(err);
            }
        }
    }

    fn install_in_background(&self, settings: &Settings) {
        let installer = Arc::clone(&self.installer);
        let package_id = settings.provider.package_id.clone();
        let options = InstallOptions::everywhere(settings.provider.pre_release);
        let span = info_span!("usecase.setup_controller.background_install", package = %package_id);

        tokio::spawn(
            async move {
                match installer.install(&package_id, options).await {
                    Ok(()) => info!("provider installed in background"),
                    Err(err) => info!(error = %err, "background installation failed"),
                }
            }
            .instrument(span),
        );
    }

    /// Persists the chosen identity backend, then runs a forced sign-in setup.
    pub async fn setup_with_provider(&self, request: SetupRequest) -> SetupOutcome {
        if request.use_enterprise_provider {
            match self.handle_enterprise_instance().await {
                Some(true) => {}
                Some(false) => return SetupOutcome::Failed,
                None => return SetupOutcome::Cancelled,
            }
        }

        if let Err(err) = self.persist_auth_provider(request.use_enterprise_provider).await {
            error!(error = %err, "failed to persist identity backend");
            return SetupOutcome::Failed;
        }

        self.setup(SetupRequest {
            force_sign_in: true,
            ..request
        })
        .await
    }

    async fn persist_auth_provider(&self, use_enterprise_provider: bool) -> anyhow::Result<()> {
        let mut settings = self.settings.load().await?;
        settings.identity.auth_provider = if use_enterprise_provider {
            AuthProviderKind::Enterprise
        } else {
            AuthProviderKind::Default
        };
        self.settings.save(&settings).await
    }

    /// Ensures an enterprise instance is configured.
    ///
    /// `Some(true)` when one is configured, `Some(false)` when the entered value
    /// could not be resolved (nothing is persisted), `None` when the user cancelled.
    pub async fn handle_enterprise_instance(&self) -> Option<bool> {
        let mut settings = match self.settings.load().await {
            Ok(settings) => settings,
            Err(err) => {
                error!(error = %err, "failed to load settings");
                return Some(false);
            }
        };

        if settings
            .identity
            .enterprise_uri
            .as_deref()
            .is_some_and(is_valid_enterprise_uri)
        {
            return Some(true);
        }

        let request = InputRequest {
            prompt: format!(
                "What is your {} instance?",
                settings.provider.enterprise_backend_name
            ),
            placeholder: r#"i.e. "octocat" or "https://octocat.ghe.com"..."#.to_string(),
            value: settings.identity.enterprise_uri.clone(),
        };
        let value = self.dialog.input(request, &validate_enterprise_input).await?;
        if value.is_empty() {
            return None;
        }

        let uri = match resolve_enterprise_uri(&value) {
            Ok(uri) => uri,
            Err(err) => {
                warn!(error = %err, "rejected enterprise instance");
                return Some(false);
            }
        };

        settings.identity.enterprise_uri = Some(uri.clone());
        if let Err(err) = self.settings.save(&settings).await {
            error!(error = %err, "failed to persist enterprise instance");
            return Some(false);
        }
        info!(%uri, "enterprise instance configured");
        Some(true)
    }
}

/// Returns the step to `Initial`, then lets the context flush its change.
struct SetupRunGuard<'a> {
    controller: &'a SetupController,
    _suspended: SuspendGuard,
}

impl Drop for SetupRunGuard<'_> {
    fn drop(&mut self) {
        self.controller.set_step(SetupStep::Initial);
    }
}
