//! Per-call routing input and output.

use crate::content::StyleParameters;
use crate::providers::ProviderError;

/// `provider_used` value for locally synthesized copy.
pub const FALLBACK_PROVIDER: &str = "fallback";

/// A content-generation request, built per inbound call.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub text: String,
    pub style: StyleParameters,
    pub preferred_provider: Option<String>,
}

impl GenerationRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_style(mut self, style: StyleParameters) -> Self {
        self.style = style;
        self
    }

    pub fn with_preferred_provider(mut self, name: impl Into<String>) -> Self {
        self.preferred_provider = Some(name.into());
        self
    }
}

/// A failed attempt against one provider.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRecord {
    pub provider: String,
    pub error: ProviderError,
}

/// Outcome of routing one request.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub body: String,
    pub provider_used: String,
    /// Failed attempts, in the order they were made.
    pub attempt_log: Vec<AttemptRecord>,
}

impl GenerationResult {
    pub fn is_fallback(&self) -> bool {
        self.provider_used == FALLBACK_PROVIDER
    }
}
