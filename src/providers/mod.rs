//! Text provider adapters.
//!
//! Each adapter speaks one provider dialect and exposes the same
//! [`TextProvider`] capability, so the router can iterate over them
//! without knowing which API sits behind a name.

mod anthropic;
mod openai;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{Config, ProviderConfig, ProviderKind};

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiCompatProvider;

/// System instruction sent ahead of every user prompt.
pub const SYSTEM_PROMPT: &str =
    "You are an expert marketing copywriter. Reply with the finished copy only, no preamble.";

/// Longest upstream error body kept in an error message.
const MAX_ERROR_BODY: usize = 200;

/// Errors from a single provider call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("no credential configured")]
    NotConfigured,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("empty response body")]
    EmptyBody,

    #[error("timed out after {0} ms")]
    Timeout(u64),
}

impl ProviderError {
    /// Short, header-safe code for this failure.
    pub fn code(&self) -> String {
        match self {
            ProviderError::NotConfigured => "not-configured".to_string(),
            ProviderError::Transport(_) => "transport".to_string(),
            ProviderError::Status { status, .. } => format!("http-{}", status),
            ProviderError::Malformed(_) => "malformed".to_string(),
            ProviderError::EmptyBody => "empty".to_string(),
            ProviderError::Timeout(_) => "timeout".to_string(),
        }
    }

    /// Classify a reqwest failure, reporting timeouts against the call budget.
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(timeout.as_millis() as u64)
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

/// A prompt ready to send, plus an optional sampling temperature.
#[derive(Debug, Clone, Copy)]
pub struct Prompt<'a> {
    pub text: &'a str,
    pub temperature: Option<f32>,
}

impl<'a> Prompt<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            temperature: None,
        }
    }
}

/// A configured external text-generation endpoint.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Configured provider name.
    fn name(&self) -> &str;

    /// Whether a non-blank credential is configured.
    fn has_credential(&self) -> bool;

    /// Per-call timeout for this provider.
    fn timeout(&self) -> Duration;

    /// Send one completion request and return the generated text.
    ///
    /// Succeeds only with a non-empty body.
    async fn attempt(&self, prompt: &Prompt<'_>, timeout: Duration)
        -> Result<String, ProviderError>;

    /// Cheap reachability check that spends no tokens.
    async fn probe(&self, timeout: Duration) -> Result<String, ProviderError>;
}

/// Build one adapter per configured provider, in configuration order.
pub fn build_providers(config: &Config, client: &reqwest::Client) -> Vec<Arc<dyn TextProvider>> {
    config
        .providers
        .iter()
        .map(|p| build_provider(p, config.routing.timeout_ms, client.clone()))
        .collect()
}

fn build_provider(
    config: &ProviderConfig,
    default_timeout_ms: u64,
    client: reqwest::Client,
) -> Arc<dyn TextProvider> {
    let timeout = config.timeout(default_timeout_ms);
    match config.kind {
        ProviderKind::OpenAi => Arc::new(OpenAiCompatProvider::new(config, timeout, client)),
        ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(config, timeout, client)),
    }
}

/// Turn a non-2xx response into `ProviderError::Status`, passing 2xx through.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Status {
        status: status.as_u16(),
        body: truncate(&body, MAX_ERROR_BODY),
    })
}

/// Truncate on a char boundary.
fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Trimmed text or `EmptyBody`.
pub(crate) fn non_empty(text: Option<String>) -> Result<String, ProviderError> {
    match text.map(|t| t.trim().to_string()) {
        Some(t) if !t.is_empty() => Ok(t),
        _ => Err(ProviderError::EmptyBody),
    }
}
