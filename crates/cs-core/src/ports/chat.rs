use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::chat::{ChatLocation, ChatRequest, ModeSelection, ResendOptions};
use crate::ids::SessionId;

/// Output side of one chat session.
#[async_trait]
pub trait ChatTranscriptPort: Send + Sync {
    async fn push_progress(&self, session: &SessionId, text: &str);

    async fn push_warning(&self, session: &SessionId, text: &str);

    async fn push_markdown(&self, session: &SessionId, text: &str);

    async fn clear(&self, session: &SessionId);

    async fn current_selection(&self, session: &SessionId) -> ModeSelection;

    async fn resend_request(&self, request: ChatRequest, options: ResendOptions) -> anyhow::Result<()>;
}

/// The default provider agent failed to activate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationFailure {
    pub location: ChatLocation,
    pub reason: String,
}

#[async_trait]
pub trait ChatServicePort: Send + Sync {
    async fn activate_default_agent(&self, location: ChatLocation) -> anyhow::Result<()>;

    fn subscribe_activation_failures(&self) -> mpsc::UnboundedReceiver<ActivationFailure>;

    async fn reveal_chat_view(&self);
}
