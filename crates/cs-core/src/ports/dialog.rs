use async_trait::async_trait;

use crate::setup::{InputFeedback, StrategyPrompt};

/// Error confirmation; the primary button retries the failed step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    pub message: String,
    pub detail: Option<String>,
    pub primary_button: String,
}

impl ConfirmRequest {
    pub fn retry(message: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            message: message.into(),
            detail,
            primary_button: "Retry".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmResult {
    pub confirmed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRequest {
    pub prompt: String,
    pub placeholder: String,
    pub value: Option<String>,
}

/// Called by the input box on every edit.
pub type InputValidator = dyn Fn(&str) -> Option<InputFeedback> + Send + Sync;

#[async_trait]
pub trait DialogPort: Send + Sync {
    async fn confirm(&self, request: ConfirmRequest) -> ConfirmResult;

    /// Shows the strategy prompt; returns the chosen button index, `None` when dismissed.
    async fn choose(&self, prompt: &StrategyPrompt) -> Option<usize>;

    /// Input box; `None` when cancelled.
    async fn input(&self, request: InputRequest, validator: &InputValidator) -> Option<String>;
}
