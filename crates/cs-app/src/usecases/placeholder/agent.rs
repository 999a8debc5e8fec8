use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, info_span, warn, Instrument};

use cs_core::chat::{rewrite_request, ChatLocation, ChatMode, ChatRequest, ResendOptions};
use cs_core::ids::SessionId;
use cs_core::ports::{
    ActivationFailure, ChatServicePort, ChatTranscriptPort, ReadinessOraclePort, SettingsPort,
    WorkspaceTrustPort,
};
use cs_core::setup::{SetupOptions, SetupOutcome, SetupResult, SetupStep};

use super::readiness::{ReadinessCondition, ReadinessSignal, ReadinessWait};
use super::{
    ForwardError, ForwardOutcome, ForwardingConfig, InvokeOutcome, ReadinessFailure,
    UnresolvableError,
};
use crate::deps::AppDeps;
use crate::usecases::provisioning_context::ProvisioningContext;
use crate::usecases::setup::{load_settings_or_default, SetupController, SetupRunner};

const GETTING_READY: &str = "Getting chat ready...";
const ALMOST_READY: &str = "Chat is almost ready...";
const SETUP_FAILED: &str = "Chat setup failed.";
const FORWARD_FAILED: &str = "Failed to get a response. Please try again.";
const TOOK_TOO_LONG: &str = "Chat took too long to get ready. Please ensure you are signed in and that the provider is installed and enabled.";
const FAILED_TO_GET_READY: &str = "Chat failed to get ready. Please ensure you are signed in and that the provider is installed and enabled.";
const SETUP_NEEDED: &str =
    "**Chat setup is not complete.** Set up chat to start using AI features.";
const TRUST_NEEDED: &str =
    "**This workspace is not trusted.** AI features are only available in trusted workspaces.";

/// Chat agent registered until the real provider takes over a surface.
pub struct PlaceholderAgent {
    location: ChatLocation,
    mode: Option<ChatMode>,
    context: Arc<ProvisioningContext>,
    runner: SetupRunner,
    controller: Arc<SetupController>,
    readiness: Arc<dyn ReadinessOraclePort>,
    transcript: Arc<dyn ChatTranscriptPort>,
    chat_service: Arc<dyn ChatServicePort>,
    workspace_trust: Arc<dyn WorkspaceTrustPort>,
    settings: Arc<dyn SettingsPort>,
    config: ForwardingConfig,
    pending_forwards: Mutex<HashSet<SessionId>>,
    unresolvable: Mutex<Vec<mpsc::UnboundedSender<UnresolvableError>>>,
}

impl PlaceholderAgent {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        location: ChatLocation,
        mode: Option<ChatMode>,
        context: Arc<ProvisioningContext>,
        runner: SetupRunner,
        controller: Arc<SetupController>,
        deps: &AppDeps,
        config: ForwardingConfig,
    ) -> Self {
        Self {
            location,
            mode,
            context,
            runner,
            controller,
            readiness: Arc::clone(&deps.readiness),
            transcript: Arc::clone(&deps.transcript),
            chat_service: Arc::clone(&deps.chat_service),
            workspace_trust: Arc::clone(&deps.workspace_trust),
            settings: Arc::clone(&deps.settings),
            config,
            pending_forwards: Mutex::new(HashSet::new()),
            unresolvable: Mutex::new(Vec::new()),
        }
    }

    pub fn location(&self) -> ChatLocation {
        self.location
    }

    pub fn mode(&self) -> Option<ChatMode> {
        self.mode
    }

    /// Notified once per forward that gives up on the provider.
    pub fn subscribe_unresolvable(&self) -> mpsc::UnboundedReceiver<UnresolvableError> {
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.unresolvable).push(tx);
        rx
    }

    pub fn is_forwarding(&self, session: &SessionId) -> bool {
        lock(&self.pending_forwards).contains(session)
    }

    /// Handles one request addressed to the placeholder.
    ///
    /// Never fails: every problem is rendered into the transcript and
    /// reflected in the returned [`InvokeOutcome`].
    pub async fn invoke(&self, request: ChatRequest) -> InvokeOutcome {
        let span = info_span!(
            "usecase.placeholder_agent.invoke",
            session = %request.session_id,
            location = ?self.location,
        );

        async move {
            let session = request.session_id.clone();

            if self.context.snapshot().is_ready() {
                self.transcript.push_progress(&session, GETTING_READY).await;
                return self.forward_and_report(request).await;
            }

            let result = self.run_setup_with_progress(&session).await;
            match result.outcome {
                SetupOutcome::Succeeded if result.dialog_skipped => {
                    debug!("setup ran without dialog, clearing transcript");
                    self.transcript.clear(&session).await;
                    InvokeOutcome::TranscriptCleared
                }
                SetupOutcome::Succeeded => self.forward_and_report(request).await,
                SetupOutcome::Failed => {
                    self.transcript.push_warning(&session, SETUP_FAILED).await;
                    InvokeOutcome::SetupFailed
                }
                SetupOutcome::Cancelled => {
                    let advisory = if self.workspace_trust.is_trusted() {
                        SETUP_NEEDED
                    } else {
                        TRUST_NEEDED
                    };
                    self.transcript.push_markdown(&session, advisory).await;
                    InvokeOutcome::SetupCancelled
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Runs setup while relaying controller steps as transcript progress.
    async fn run_setup_with_progress(&self, session: &SessionId) -> SetupResult {
        let mut steps = self.controller.subscribe_steps();
        let run = self.runner.run(SetupOptions {
            disable_chat_view_reveal: true,
            ..SetupOptions::default()
        });
        tokio::pin!(run);

        let mut steps_open = true;
        loop {
            tokio::select! {
                result = &mut run => {
                    while let Ok(step) = steps.try_recv() {
                        self.relay_step(session, step).await;
                    }
                    return result;
                }
                step = steps.recv(), if steps_open => match step {
                    Some(step) => self.relay_step(session, step).await,
                    None => steps_open = false,
                },
            }
        }
    }

    async fn relay_step(&self, session: &SessionId, step: SetupStep) {
        match step {
            SetupStep::SigningIn => {
                let settings = load_settings_or_default(self.settings.as_ref()).await;
                let message = format!("Signing in to {}...", settings.backend_name());
                self.transcript.push_progress(session, &message).await;
            }
            SetupStep::Installing => {
                self.transcript.push_progress(session, GETTING_READY).await;
            }
            SetupStep::Initial => {}
        }
    }

    async fn forward_and_report(&self, request: ChatRequest) -> InvokeOutcome {
        let session = request.session_id.clone();
        match self.forward(request).await {
            Ok(outcome) => InvokeOutcome::Forwarded(outcome),
            Err(err) => {
                error!(error = %err, "forwarding to the chat provider failed");
                self.transcript.push_warning(&session, FORWARD_FAILED).await;
                InvokeOutcome::ForwardFailed
            }
        }
    }

    /// Waits for the real provider, then resends `request` to it.
    ///
    /// At most one forward runs per session; a concurrent call fails fast with
    /// [`ForwardError::AlreadyInProgress`].
    pub async fn forward(&self, request: ChatRequest) -> Result<ForwardOutcome, ForwardError> {
        let _guard = self.begin_forward(&request.session_id)?;

        // Subscribed before activation so an immediate failure is observed.
        let failures = self.chat_service.subscribe_activation_failures();
        self.activate_default_agent();

        let mut conditions = vec![ReadinessCondition::model(request.model_id.clone())];
        if request.references_tools() {
            conditions.push(ReadinessCondition::tools(
                self.config.naming.provider_tool_prefix.clone(),
            ));
        }
        conditions.push(ReadinessCondition::agent(self.location, self.mode));

        let mut waiting = HashSet::new();
        let waits = FuturesUnordered::new();
        for condition in conditions {
            let signal = condition.signal;
            if let ReadinessWait::Pending(wait) = condition.wait(Arc::clone(&self.readiness)) {
                waiting.insert(signal);
                let wait: BoxFuture<'static, ReadinessSignal> = Box::pin(async move {
                    wait.await;
                    signal
                });
                waits.push(wait);
            }
        }

        if !waiting.is_empty() {
            debug!(?waiting, "waiting for the chat provider to register");
            if let Err(failure) = self
                .await_readiness(&request.session_id, waiting, waits, failures)
                .await
            {
                self.report_unresolvable(&request.session_id, failure.clone())
                    .await;
                return Ok(ForwardOutcome::Unresolved(failure));
            }
        }

        self.resend(request).await.map_err(ForwardError::Resend)?;
        Ok(ForwardOutcome::Resent)
    }

    async fn await_readiness(
        &self,
        session: &SessionId,
        mut waiting: HashSet<ReadinessSignal>,
        mut waits: FuturesUnordered<BoxFuture<'static, ReadinessSignal>>,
        mut failures: mpsc::UnboundedReceiver<ActivationFailure>,
    ) -> Result<(), ReadinessFailure> {
        let deadline = tokio::time::sleep(self.config.ready_timeout);
        let notice = tokio::time::sleep(self.config.almost_ready_notice);
        tokio::pin!(deadline, notice);

        let mut failures_open = true;
        let mut notice_shown = false;
        loop {
            tokio::select! {
                biased;

                Some(signal) = waits.next() => {
                    waiting.remove(&signal);
                    debug!(%signal, "readiness signal resolved");
                    if waiting.is_empty() {
                        return Ok(());
                    }
                }
                _ = &mut deadline => {
                    let mut pending: Vec<_> = waiting.into_iter().collect();
                    pending.sort();
                    return Err(ReadinessFailure::TimedOut { pending });
                }
                failure = failures.recv(), if failures_open => match failure {
                    Some(failure) if failure.location == self.location => {
                        return Err(ReadinessFailure::ActivationFailed { reason: failure.reason });
                    }
                    Some(_) => {}
                    None => failures_open = false,
                },
                _ = &mut notice, if !notice_shown => {
                    notice_shown = true;
                    self.transcript.push_progress(session, ALMOST_READY).await;
                }
            }
        }
    }

    async fn resend(&self, request: ChatRequest) -> anyhow::Result<()> {
        let selection = self.transcript.current_selection(&request.session_id).await;
        let rewritten = rewrite_request(&request, &self.config.naming, |id| {
            self.readiness.agent(id)
        });
        let options = ResendOptions {
            mode: selection.mode.or(self.mode),
            user_selected_model_id: selection.model_id,
        };

        info!(request = %rewritten.id, mode = ?options.mode, "resending request to the chat provider");
        self.transcript
            .resend_request(rewritten, options)
            .await
            .context("chat provider rejected the resent request")
    }

    async fn report_unresolvable(&self, session: &SessionId, reason: ReadinessFailure) {
        warn!(%reason, "chat provider did not become ready");
        let message = match reason {
            ReadinessFailure::TimedOut { .. } => TOOK_TOO_LONG,
            ReadinessFailure::ActivationFailed { .. } => FAILED_TO_GET_READY,
        };
        self.transcript.push_warning(session, message).await;

        let error = UnresolvableError {
            location: self.location,
            mode: self.mode,
            reason,
        };
        lock(&self.unresolvable).retain(|subscriber| subscriber.send(error.clone()).is_ok());
    }

    fn activate_default_agent(&self) {
        let chat_service = Arc::clone(&self.chat_service);
        let location = self.location;
        tokio::spawn(async move {
            if let Err(err) = chat_service.activate_default_agent(location).await {
                debug!(error = %err, ?location, "default agent activation failed");
            }
        });
    }

    fn begin_forward(&self, session: &SessionId) -> Result<ForwardGuard<'_>, ForwardError> {
        let mut pending = lock(&self.pending_forwards);
        if !pending.insert(session.clone()) {
            warn!(%session, "forward already in progress");
            return Err(ForwardError::AlreadyInProgress(session.clone()));
        }
        Ok(ForwardGuard {
            pending: &self.pending_forwards,
            session: session.clone(),
        })
    }
}

/// Removes the session from the in-flight set however the forward ends.
struct ForwardGuard<'a> {
    pending: &'a Mutex<HashSet<SessionId>>,
    session: SessionId,
}

impl Drop for ForwardGuard<'_> {
    fn drop(&mut self) {
        lock(self.pending).remove(&self.session);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
