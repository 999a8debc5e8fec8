//! Enterprise instance resolution.
//!
//! Accepts either a bare instance name (`octocat`) or a full instance URI
//! (`https://octocat.ghe.com`) and resolves it to the canonical URI form.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static SHORT_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z\-_]+$").expect("short name pattern is valid")
});

static FULL_URI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https://)?([a-zA-Z0-9-]+\.)*[a-zA-Z0-9-]+\.ghe\.com/?$")
        .expect("full uri pattern is valid")
});

const INVALID_INSTANCE_MESSAGE: &str =
    r#"You must enter a valid enterprise instance (i.e. "octocat" or "https://octocat.ghe.com")"#;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnterpriseUriError {
    #[error("enterprise instance is empty")]
    Empty,

    #[error("invalid enterprise instance: {0}")]
    Invalid(String),
}

/// Interactive feedback while the user types an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputFeedback {
    /// Informational, the value is acceptable.
    Info(String),
    /// Hard validation error, the value cannot be accepted.
    Error(String),
}

impl InputFeedback {
    pub fn is_error(&self) -> bool {
        matches!(self, InputFeedback::Error(_))
    }
}

/// A persisted value that needs no prompting.
pub fn is_valid_enterprise_uri(uri: &str) -> bool {
    FULL_URI.is_match(uri)
}

/// Validation callback for the instance input box.
pub fn validate_enterprise_input(value: &str) -> Option<InputFeedback> {
    if value.is_empty() {
        return None;
    }

    if SHORT_NAME.is_match(value) {
        return Some(InputFeedback::Info(format!(
            "Will resolve to {}",
            short_name_uri(value)
        )));
    }

    if !FULL_URI.is_match(value) {
        return Some(InputFeedback::Error(INVALID_INSTANCE_MESSAGE.to_string()));
    }

    None
}

/// Resolves user input to the canonical `https://<name>.ghe.com` form.
pub fn resolve_enterprise_uri(value: &str) -> Result<String, EnterpriseUriError> {
    if value.is_empty() {
        return Err(EnterpriseUriError::Empty);
    }

    if SHORT_NAME.is_match(value) {
        return Ok(short_name_uri(value));
    }

    if !FULL_URI.is_match(value) {
        return Err(EnterpriseUriError::Invalid(value.to_string()));
    }

    if value.to_lowercase().starts_with("https://") {
        Ok(value.to_string())
    } else {
        Ok(format!("https://{value}"))
    }
}

fn short_name_uri(name: &str) -> String {
    format!("https://{name}.ghe.com")
}
