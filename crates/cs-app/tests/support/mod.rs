#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mockall::mock;
use tokio::sync::{mpsc, Notify};

use cs_app::AppDeps;
use cs_core::chat::{
    AgentDescriptor, ChatLocation, ChatMessage, ChatMode, ChatRequest, ModeSelection, OffsetRange,
    RequestPart, ResendOptions,
};
use cs_core::ids::{AgentId, SessionId, ToolId};
use cs_core::ports::*;
use cs_core::provisioning::Entitlement;
use cs_core::settings::model::{AuthProviderKind, Settings};
use cs_core::setup::{InputFeedback, StrategyPrompt};

mock! {
    pub Identity {}

    #[async_trait]
    impl IdentityPort for Identity {
        async fn sign_in(&self, request: SignInRequest) -> anyhow::Result<SignInResult>;
        async fn sessions(&self, provider: AuthProviderKind) -> anyhow::Result<Vec<AuthSession>>;
    }
}

mock! {
    pub Installer {}

    #[async_trait]
    impl InstallerPort for Installer {
        async fn install(&self, package_id: &str, options: InstallOptions) -> anyhow::Result<()>;
        async fn refresh_tokens(&self) -> anyhow::Result<()>;
    }
}

mock! {
    pub Entitlements {}

    #[async_trait]
    impl EntitlementPort for Entitlements {
        async fn sign_up_free(&self, sessions: &[AuthSession]) -> Result<bool, SignUpError>;
        async fn force_resolve(&self, session: &AuthSession) -> anyhow::Result<Entitlement>;
    }
}

pub fn session() -> AuthSession {
    AuthSession {
        id: "session-1".to_string(),
        account: "octocat".to_string(),
        scopes: vec!["user:email".to_string()],
    }
}

pub fn signed_in(entitlement: Option<Entitlement>) -> SignInResult {
    SignInResult {
        session: Some(session()),
        entitlement,
    }
}

/// Identity mock that signs in successfully with the given entitlement.
pub fn identity_signing_in(entitlement: Entitlement) -> MockIdentity {
    let mut identity = MockIdentity::new();
    identity
        .expect_sign_in()
        .returning(move |_| Ok(signed_in(Some(entitlement))));
    identity
}

/// Installer mock that succeeds exactly `times` times.
pub fn installer_succeeding(times: usize) -> MockInstaller {
    let mut installer = MockInstaller::new();
    installer.expect_install().times(times).returning(|_, _| Ok(()));
    installer
}

#[derive(Default)]
pub struct FakeSettings {
    settings: Mutex<Settings>,
    saves: Mutex<Vec<Settings>>,
}

impl FakeSettings {
    pub fn with(settings: Settings) -> Self {
        Self {
            settings: Mutex::new(settings),
            saves: Mutex::new(Vec::new()),
        }
    }

    pub fn current(&self) -> Settings {
        self.settings.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.lock().unwrap().len()
    }
}

#[async_trait]
impl SettingsPort for FakeSettings {
    async fn load(&self) -> anyhow::Result<Settings> {
        Ok(self.current())
    }

    async fn save(&self, settings: &Settings) -> anyhow::Result<()> {
        *self.settings.lock().unwrap() = settings.clone();
        self.saves.lock().unwrap().push(settings.clone());
        Ok(())
    }
}

/// Scripted dialogs. Unscripted confirmations decline, unscripted choices
/// and inputs dismiss.
#[derive(Default)]
pub struct FakeDialog {
    choices: Mutex<VecDeque<Option<usize>>>,
    confirmations: Mutex<VecDeque<bool>>,
    inputs: Mutex<VecDeque<Option<String>>>,
    choose_gate: Mutex<Option<Arc<Notify>>>,
    pub prompts: Mutex<Vec<StrategyPrompt>>,
    pub confirm_requests: Mutex<Vec<ConfirmRequest>>,
    pub input_feedback: Mutex<Vec<Option<InputFeedback>>>,
}

impl FakeDialog {
    pub fn choosing(self, choice: Option<usize>) -> Self {
        self.choices.lock().unwrap().push_back(choice);
        self
    }

    pub fn confirming(self, answer: bool) -> Self {
        self.confirmations.lock().unwrap().push_back(answer);
        self
    }

    pub fn entering(self, value: Option<&str>) -> Self {
        self.inputs
            .lock()
            .unwrap()
            .push_back(value.map(str::to_string));
        self
    }

    /// `choose` blocks until the returned gate is notified.
    pub fn gated(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.choose_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn choose_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn confirm_count(&self) -> usize {
        self.confirm_requests.lock().unwrap().len()
    }
}

#[async_trait]
impl DialogPort for FakeDialog {
    async fn confirm(&self, request: ConfirmRequest) -> ConfirmResult {
        self.confirm_requests.lock().unwrap().push(request);
        let confirmed = self
            .confirmations
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(false);
        ConfirmResult { confirmed }
    }

    async fn choose(&self, prompt: &StrategyPrompt) -> Option<usize> {
        self.prompts.lock().unwrap().push(prompt.clone());
        let gate = self.choose_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.choices.lock().unwrap().pop_front().flatten()
    }

    async fn input(&self, _request: InputRequest, validator: &InputValidator) -> Option<String> {
        let value = self.inputs.lock().unwrap().pop_front().flatten();
        if let Some(value) = value.as_deref() {
            self.input_feedback.lock().unwrap().push(validator(value));
        }
        value
    }
}

pub struct FakeTrust {
    trusted: Mutex<bool>,
    grant: bool,
    /// Requests after this many are denied.
    grant_limit: Option<usize>,
    pub requests: Mutex<usize>,
}

impl FakeTrust {
    pub fn trusted() -> Self {
        Self {
            trusted: Mutex::new(true),
            grant: true,
            grant_limit: None,
            requests: Mutex::new(0),
        }
    }

    /// Starts untrusted, grants the first request and denies the rest.
    pub fn granting_once() -> Self {
        Self {
            trusted: Mutex::new(false),
            grant: true,
            grant_limit: Some(1),
            requests: Mutex::new(0),
        }
    }

    pub fn denying() -> Self {
        Self {
            trusted: Mutex::new(false),
            grant: false,
            grant_limit: None,
            requests: Mutex::new(0),
        }
    }
}

#[async_trait]
impl WorkspaceTrustPort for FakeTrust {
    fn is_trusted(&self) -> bool {
        *self.trusted.lock().unwrap()
    }

    async fn request_trust(&self, _message: &str) -> bool {
        let count = {
            let mut requests = self.requests.lock().unwrap();
            *requests += 1;
            *requests
        };
        let mut trusted = self.trusted.lock().unwrap();
        match self.grant_limit {
            Some(limit) if count > limit => *trusted = false,
            _ if self.grant => *trusted = true,
            _ => {}
        }
        *trusted
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEvent {
    Progress(String),
    Warning(String),
    Markdown(String),
    Cleared,
}

#[derive(Default)]
pub struct FakeTranscript {
    pub events: Mutex<Vec<TranscriptEvent>>,
    pub resent: Mutex<Vec<(ChatRequest, ResendOptions)>>,
    pub selection: Mutex<ModeSelection>,
}

impl FakeTranscript {
    pub fn events(&self) -> Vec<TranscriptEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                TranscriptEvent::Warning(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn progress(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                TranscriptEvent::Progress(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn resent(&self) -> Vec<(ChatRequest, ResendOptions)> {
        self.resent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTranscriptPort for FakeTranscript {
    async fn push_progress(&self, _session: &SessionId, text: &str) {
        self.events
            .lock()
            .unwrap()
            .push(TranscriptEvent::Progress(text.to_string()));
    }

    async fn push_warning(&self, _session: &SessionId, text: &str) {
        self.events
            .lock()
            .unwrap()
            .push(TranscriptEvent::Warning(text.to_string()));
    }

    async fn push_markdown(&self, _session: &SessionId, text: &str) {
        self.events
            .lock()
            .unwrap()
            .push(TranscriptEvent::Markdown(text.to_string()));
    }

    async fn clear(&self, _session: &SessionId) {
        self.events.lock().unwrap().push(TranscriptEvent::Cleared);
    }

    async fn current_selection(&self, _session: &SessionId) -> ModeSelection {
        self.selection.lock().unwrap().clone()
    }

    async fn resend_request(&self, request: ChatRequest, options: ResendOptions) -> anyhow::Result<()> {
        self.resent.lock().unwrap().push((request, options));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeChatService {
    failures: Mutex<Vec<mpsc::UnboundedSender<ActivationFailure>>>,
    pub activations: Mutex<Vec<ChatLocation>>,
    pub reveals: Mutex<usize>,
}

impl FakeChatService {
    pub fn fail_activation(&self, location: ChatLocation, reason: &str) {
        let failure = ActivationFailure {
            location,
            reason: reason.to_string(),
        };
        self.failures
            .lock()
            .unwrap()
            .retain(|subscriber| subscriber.send(failure.clone()).is_ok());
    }

    pub fn reveal_count(&self) -> usize {
        *self.reveals.lock().unwrap()
    }
}

#[async_trait]
impl ChatServicePort for FakeChatService {
    async fn activate_default_agent(&self, location: ChatLocation) -> anyhow::Result<()> {
        self.activations.lock().unwrap().push(location);
        Ok(())
    }

    fn subscribe_activation_failures(&self) -> mpsc::UnboundedReceiver<ActivationFailure> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.failures.lock().unwrap().push(tx);
        rx
    }

    async fn reveal_chat_view(&self) {
        *self.reveals.lock().unwrap() += 1;
    }
}

#[derive(Default)]
struct Registrations {
    default_model: bool,
    tools: Vec<String>,
    default_agent: Option<AgentDescriptor>,
    agents: Vec<AgentDescriptor>,
}

#[derive(Default)]
pub struct FakeReadiness {
    registrations: Mutex<Registrations>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<ReadinessChange>>>,
}

impl FakeReadiness {
    /// Registers everything the real provider announces once it is up.
    pub fn register_provider(&self) {
        {
            let mut registrations = self.registrations.lock().unwrap();
            let agent = provider_agent();
            registrations.default_model = true;
            registrations.tools.push("realProvider_search".to_string());
            registrations.default_agent = Some(agent.clone());
            registrations.agents.push(agent);
        }
        self.notify(ReadinessChange::ModelsChanged);
        self.notify(ReadinessChange::ToolsChanged);
        self.notify(ReadinessChange::AgentsChanged);
    }

    /// Default model and provider agent, no tools.
    pub fn register_model_and_agent(&self) {
        {
            let mut registrations = self.registrations.lock().unwrap();
            let agent = provider_agent();
            registrations.default_model = true;
            registrations.default_agent = Some(agent.clone());
            registrations.agents.push(agent);
        }
        self.notify(ReadinessChange::ModelsChanged);
        self.notify(ReadinessChange::AgentsChanged);
    }

    pub fn register_placeholder_agent(&self) {
        self.registrations.lock().unwrap().default_agent = Some(placeholder_agent());
        self.notify(ReadinessChange::AgentsChanged);
    }

    fn notify(&self, change: ReadinessChange) {
        self.subscribers
            .lock()
            .unwrap()
            .retain(|subscriber| subscriber.send(change).is_ok());
    }
}

impl ReadinessOraclePort for FakeReadiness {
    fn has_model(&self, _model_id: Option<&str>) -> bool {
        self.registrations.lock().unwrap().default_model
    }

    fn has_tool_with_prefix(&self, prefix: &str) -> bool {
        self.registrations
            .lock()
            .unwrap()
            .tools
            .iter()
            .any(|tool| tool.starts_with(prefix))
    }

    fn default_agent(&self, _location: ChatLocation, _mode: Option<ChatMode>) -> Option<AgentDescriptor> {
        self.registrations.lock().unwrap().default_agent.clone()
    }

    fn agent(&self, id: &AgentId) -> Option<AgentDescriptor> {
        self.registrations
            .lock()
            .unwrap()
            .agents
            .iter()
            .find(|agent| &agent.id == id)
            .cloned()
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<ReadinessChange> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().unwrap().push(tx);
        rx
    }
}

pub fn provider_agent() -> AgentDescriptor {
    AgentDescriptor {
        id: AgentId::new("realprovider.chat"),
        name: "chat".to_string(),
        is_placeholder: false,
    }
}

pub fn placeholder_agent() -> AgentDescriptor {
    AgentDescriptor {
        id: AgentId::new("placeholder.chat"),
        name: "chat".to_string(),
        is_placeholder: true,
    }
}

/// `@chat #search find the bug`, addressed to the placeholder.
pub fn placeholder_request(session: &str) -> ChatRequest {
    let message = ChatMessage {
        text: "@chat #search find the bug".to_string(),
        parts: vec![
            RequestPart::Agent {
                range: OffsetRange::new(0, 5),
                agent: placeholder_agent(),
            },
            RequestPart::Text {
                range: OffsetRange::new(5, 6),
                text: " ".to_string(),
            },
            RequestPart::Tool {
                range: OffsetRange::new(6, 13),
                tool_id: ToolId::new("placeholder.tools.search"),
                tool_name: "search".to_string(),
                display_name: "Search".to_string(),
            },
            RequestPart::Text {
                range: OffsetRange::new(13, 26),
                text: " find the bug".to_string(),
            },
        ],
    };
    ChatRequest::new(SessionId::new(session), ChatLocation::Panel, message)
}

/// Every collaborator of the setup flow, with fakes kept reachable for assertions.
pub struct Harness {
    pub settings: Arc<FakeSettings>,
    pub dialog: Arc<FakeDialog>,
    pub trust: Arc<FakeTrust>,
    pub transcript: Arc<FakeTranscript>,
    pub chat_service: Arc<FakeChatService>,
    pub readiness: Arc<FakeReadiness>,
    pub deps: AppDeps,
}

pub struct HarnessBuilder {
    settings: Settings,
    dialog: FakeDialog,
    trust: FakeTrust,
    identity: MockIdentity,
    installer: MockInstaller,
    entitlement: MockEntitlements,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self {
            settings: Settings::default(),
            dialog: FakeDialog::default(),
            trust: FakeTrust::trusted(),
            identity: MockIdentity::new(),
            installer: MockInstaller::new(),
            entitlement: MockEntitlements::new(),
        }
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn dialog(mut self, dialog: FakeDialog) -> Self {
        self.dialog = dialog;
        self
    }

    pub fn trust(mut self, trust: FakeTrust) -> Self {
        self.trust = trust;
        self
    }

    pub fn identity(mut self, identity: MockIdentity) -> Self {
        self.identity = identity;
        self
    }

    pub fn installer(mut self, installer: MockInstaller) -> Self {
        self.installer = installer;
        self
    }

    pub fn entitlement(mut self, entitlement: MockEntitlements) -> Self {
        self.entitlement = entitlement;
        self
    }

    pub fn build(self) -> Harness {
        let settings = Arc::new(FakeSettings::with(self.settings));
        let dialog = Arc::new(self.dialog);
        let trust = Arc::new(self.trust);
        let transcript = Arc::new(FakeTranscript::default());
        let chat_service = Arc::new(FakeChatService::default());
        let readiness = Arc::new(FakeReadiness::default());

        let deps = AppDeps {
            settings: settings.clone(),
            identity: Arc::new(self.identity),
            installer: Arc::new(self.installer),
            entitlement: Arc::new(self.entitlement),
            dialog: dialog.clone(),
            workspace_trust: trust.clone(),
            transcript: transcript.clone(),
            chat_service: chat_service.clone(),
            readiness: readiness.clone(),
        };

        Harness {
            settings,
            dialog,
            trust,
            transcript,
            chat_service,
            readiness,
            deps,
        }
    }
}

/// `@chat explain this`, addressed to the placeholder without tool references.
pub fn plain_request(session: &str) -> ChatRequest {
    let message = ChatMessage {
        text: "@chat explain this".to_string(),
        parts: vec![
            RequestPart::Agent {
                range: OffsetRange::new(0, 5),
                agent: placeholder_agent(),
            },
            RequestPart::Text {
                range: OffsetRange::new(5, 18),
                text: " explain this".to_string(),
            },
        ],
    };
    ChatRequest::new(SessionId::new(session), ChatLocation::Panel, message)
}
