use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{BoxFuture, FutureExt, Shared};
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{debug, error, info, info_span, Instrument};

use cs_core::ports::{ChatServicePort, SettingsPort, WorkspaceTrustPort};
use cs_core::provisioning::{Entitlement, ProvisioningPatch};
use cs_core::settings::model::{AuthProviderKind, SocialProvider};
use cs_core::setup::{SetupOptions, SetupOutcome, SetupRequest, SetupResult, SetupStrategy};

use super::{load_settings_or_default, SetupController, StrategyDialog, TRUST_REQUEST_MESSAGE};
use crate::deps::AppDeps;
use crate::usecases::provisioning_context::ProvisioningContext;

type PendingRun = Shared<BoxFuture<'static, SetupResult>>;

#[derive(Debug, Error)]
pub enum SetupRunError {
    #[error("setup run task ended abnormally: {0}")]
    Aborted(#[from] JoinError),
}

/// Deduplicating entry point for setup.
///
/// At most one run is in flight; concurrent callers join it and observe the
/// same [`SetupResult`]. The run executes on its own task, so it completes
/// even when every caller stops waiting.
///
/// 去重的设置入口：同一时间最多只有一次运行。
#[derive(Clone)]
pub struct SetupRunner {
    inner: Arc<RunnerInner>,
}

struct RunnerInner {
    context: Arc<ProvisioningContext>,
    controller: Arc<SetupController>,
    strategy_dialog: StrategyDialog,
    settings: Arc<dyn SettingsPort>,
    workspace_trust: Arc<dyn WorkspaceTrustPort>,
    chat_service: Arc<dyn ChatServicePort>,
    pending: Mutex<Option<PendingRun>>,
    skip_dialog_once: AtomicBool,
}

impl SetupRunner {
    pub fn new(
        context: Arc<ProvisioningContext>,
        controller: Arc<SetupController>,
        deps: &AppDeps,
    ) -> Self {
        Self {
            inner: Arc::new(RunnerInner {
                context,
                controller,
                strategy_dialog: StrategyDialog::new(
                    Arc::clone(&deps.dialog),
                    Arc::clone(&deps.settings),
                ),
                settings: Arc::clone(&deps.settings),
                workspace_trust: Arc::clone(&deps.workspace_trust),
                chat_service: Arc::clone(&deps.chat_service),
                pending: Mutex::new(None),
                skip_dialog_once: AtomicBool::new(false),
            }),
        }
    }

    /// The next run bypasses the strategy dialog. Consumed by that run.
    pub fn skip_dialog(&self) {
        self.inner.skip_dialog_once.store(true, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock_pending().is_some()
    }

    pub async fn run(&self, options: SetupOptions) -> SetupResult {
        let pending = {
            let mut slot = self.inner.lock_pending();
            match slot.as_ref() {
                Some(pending) => {
                    debug!("joining pending setup run");
                    pending.clone()
                }
                None => {
                    // Inserted under the lock, so the run's reset cannot precede it.
                    let pending = self.start(options);
                    *slot = Some(pending.clone());
                    pending
                }
            }
        };
        pending.await
    }

    fn start(&self, options: SetupOptions) -> PendingRun {
        let inner = Arc::clone(&self.inner);
        let span = info_span!(
            "usecase.setup_runner.run",
            force_sign_in_dialog = options.force_sign_in_dialog,
            disable_chat_view_reveal = options.disable_chat_view_reveal,
        );

        let handle = tokio::spawn(
            async move {
                let _reset = PendingRunReset {
                    inner: Arc::clone(&inner),
                };
                inner.do_run(options).await
            }
            .instrument(span),
        );

        async move {
            match handle.await.map_err(SetupRunError::from) {
                Ok(result) => result,
                Err(err) => {
                    error!(error = %err, "setup run failed");
                    SetupResult {
                        outcome: SetupOutcome::Failed,
                        dialog_skipped: false,
                    }
                }
            }
        }
        .boxed()
        .shared()
    }
}

impl RunnerInner {
    fn lock_pending(&self) -> MutexGuard<'_, Option<PendingRun>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn do_run(&self, options: SetupOptions) -> SetupResult {
        self.context.update(ProvisioningPatch::later(false));
        let skip_requested = self.skip_dialog_once.swap(false, Ordering::SeqCst);
        let dialog_skipped = skip_requested && !options.force_sign_in_dialog;

        if !self.workspace_trust.request_trust(TRUST_REQUEST_MESSAGE).await {
            info!("workspace trust denied, setup postponed");
            self.context
                .update(ProvisioningPatch::later(true).with_untrusted(true));
            return SetupResult {
                outcome: SetupOutcome::Cancelled,
                dialog_skipped,
            };
        }

        self.context.update(ProvisioningPatch::untrusted(false));

        let state = self.context.snapshot();
        let bypass_dialog = !options.force_sign_in_dialog
            && (skip_requested
                || state.entitlement.is_paid()
                || state.entitlement == Entitlement::Free);

        let mut strategy = if bypass_dialog {
            debug!(entitlement = ?state.entitlement, skip_requested, "bypassing strategy dialog");
            SetupStrategy::DefaultSetup
        } else {
            self.strategy_dialog
                .show(&state, options.force_sign_in_dialog)
                .await
        };

        if strategy == SetupStrategy::DefaultSetup {
            let settings = load_settings_or_default(self.settings.as_ref()).await;
            if settings.identity.auth_provider == AuthProviderKind::Enterprise {
                strategy = SetupStrategy::SetupWithEnterpriseProvider;
            }
        }

        if strategy != SetupStrategy::Canceled && !options.disable_chat_view_reveal {
            self.chat_service.reveal_chat_view().await;
        }

        let scopes = options.additional_scopes;
        let outcome = match strategy {
            SetupStrategy::Canceled => {
                self.context.update(ProvisioningPatch::later(true));
                SetupOutcome::Cancelled
            }
            SetupStrategy::DefaultSetup => {
                self.controller
                    .setup(SetupRequest::default().with_scopes(scopes))
                    .await
            }
            SetupStrategy::SetupWithEnterpriseProvider => {
                self.controller
                    .setup_with_provider(SetupRequest::with_provider(true, None).with_scopes(scopes))
                    .await
            }
            SetupStrategy::SetupWithoutEnterpriseProvider => {
                self.controller
                    .setup_with_provider(SetupRequest::with_provider(false, None).with_scopes(scopes))
                    .await
            }
            SetupStrategy::SetupWithGoogleProvider => {
                self.controller
                    .setup_with_provider(
                        SetupRequest::with_provider(false, Some(SocialProvider::Google))
                            .with_scopes(scopes),
                    )
                    .await
            }
            SetupStrategy::SetupWithAppleProvider => {
                self.controller
                    .setup_with_provider(
                        SetupRequest::with_provider(false, Some(SocialProvider::Apple))
                            .with_scopes(scopes),
                    )
                    .await
            }
        };

        info!(?strategy, ?outcome, dialog_skipped, "setup run settled");
        SetupResult {
            outcome,
            dialog_skipped,
        }
    }
}

/// Clears the pending slot once the run settles.
struct PendingRunReset {
    inner: Arc<RunnerInner>,
}

impl Drop for PendingRunReset {
    fn drop(&mut self) {
        self.inner.lock_pending().take();
    }
}
